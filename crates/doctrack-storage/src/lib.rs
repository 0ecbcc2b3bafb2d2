//! Persistence layer for the HR document-tracking schema.
//!
//! The monitor owns no state between runs; everything here is either a
//! filtered read of workflow entities or an append of notification/audit
//! rows. All store functions are generic over [`sea_orm::ConnectionTrait`]
//! so one monitor pass can run entirely inside a single transaction.

pub mod entities;
pub mod store;
