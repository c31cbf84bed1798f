pub mod contribution;
pub mod ingest;
