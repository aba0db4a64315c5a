use crate::domain::model::{CleanOutcome, CountOutcome};
use crate::utils::error::Result;

/// Table persistence boundary. The pipeline stages never touch the
/// filesystem directly; everything goes through a `Storage` so the
/// aggregation logic stays independent of storage layout.
pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn file_exists(&self, path: &str) -> bool;
    /// File names (not paths) directly under `path`, sorted.
    fn list_dir(&self, path: &str) -> Result<Vec<String>>;
}

pub trait ConfigProvider {
    fn input_root(&self) -> &str;
    fn output_root(&self) -> &str;
    fn cohorts(&self) -> &[String];
    fn gene_summaries(&self) -> bool;
    fn report_path(&self) -> Option<&str>;
}

/// The three pipeline stages. Each stage persists its own outputs through
/// the storage port; the returned outcome is the in-memory hand-off to the
/// next stage. `combine` reads the count stage's tables back from storage,
/// which is what lets it run on its own against a previous run's outputs.
pub trait Pipeline {
    fn clean(&self) -> Result<CleanOutcome>;
    fn count(&self, cleaned: CleanOutcome) -> Result<CountOutcome>;
    fn combine(&self, counted: CountOutcome) -> Result<String>;
}
