use std::path::Path;

use anyhow::Result;

/// Accept only an existing regular file named `*.csv` or `*.tsv`.
pub fn validate_tsv_or_csv_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    let delimited = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv"));
    if !delimited {
        anyhow::bail!("Training data must be a .csv or .tsv file: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("Training data not found: {}", path.display());
    }

    Ok(())
}
