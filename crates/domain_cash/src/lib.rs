//! Cash Ledger Domain
//!
//! One logical cash balance exists in two physical records: the IRP-specific
//! account table and the generic all-accounts table. Both are legacy facts of
//! the platform, not a design choice this crate gets to undo, so the crate's
//! job is to make the duplication safe:
//!
//! - every balance movement hits both records in one unit of work
//! - movements against the same account are serialized
//! - a divergence between the records is detected before money moves, never after
//! - every movement appends exactly one immutable statement entry
//!
//! # Key Concepts
//!
//! - **IrpRecord**: the product-specific balance record (balance + contributions)
//! - **MirrorRecord**: the generic account record (balance only)
//! - **CashEntry**: append-only statement line with a traceable reference id
//! - **CashLedger**: the synchronizer holding both records per account

pub mod account;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod ports;

pub use account::{AccountStatus, IrpRecord, MirrorRecord};
pub use entry::{CashEntry, EntryCategory, EntryDirection, ReferenceGenerator};
pub use error::CashError;
pub use ledger::{CashLedger, CashPosting};
pub use ports::{CashLedgerPortAdapter, LedgerPort};
