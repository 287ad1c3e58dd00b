pub mod importer;

pub use importer::{DashcamImporter, ImportError, ImportOutcome, VideoInspection};
