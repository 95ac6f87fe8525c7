use crate::core::{RunReport, Storage};
use crate::utils::error::{ProbeError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const BUNDLE_FILENAME: &str = "probe_report.zip";

/// 將執行結果輸出成 JSON / CSV / TSV，必要時打包成 zip
pub struct ReportWriter<S: Storage> {
    storage: S,
    formats: Vec<String>,
    bundle: bool,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S, formats: Vec<String>, bundle: bool) -> Self {
        Self {
            storage,
            formats,
            bundle,
        }
    }

    /// Renders every requested format as `(filename, bytes)`.
    pub fn render(&self, report: &RunReport) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();

        for format in &self.formats {
            let rendered = match format.as_str() {
                "json" => serde_json::to_vec_pretty(report)?,
                "csv" => render_table(report, b',')?,
                "tsv" => render_table(report, b'\t')?,
                other => {
                    return Err(ProbeError::InvalidConfigValueError {
                        field: "report.output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported report format".to_string(),
                    })
                }
            };
            files.push((format!("results.{}", format), rendered));
        }

        Ok(files)
    }

    /// 寫入所有報告檔，回傳寫入的檔名
    pub async fn write(&self, report: &RunReport) -> Result<Vec<String>> {
        let files = self.render(report)?;

        if self.bundle {
            tracing::debug!("Creating ZIP bundle with {} files", files.len());
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP bundle ({} bytes) to storage", zip_data.len());
            self.storage.write_file(BUNDLE_FILENAME, &zip_data).await?;
            return Ok(vec![BUNDLE_FILENAME.to_string()]);
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, data) in files {
            self.storage.write_file(&name, &data).await?;
            written.push(name);
        }
        Ok(written)
    }
}

fn render_table(report: &RunReport, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(["id", "title", "status", "duration_ms", "message"])?;
    for outcome in &report.outcomes {
        let duration = outcome.duration_ms.to_string();
        writer.write_record([
            outcome.id.as_str(),
            outcome.title.as_str(),
            outcome.status.as_str(),
            duration.as_str(),
            outcome.message.as_deref().unwrap_or(""),
        ])?;
    }

    writer.into_inner().map_err(|e| ProbeError::IoError(e.into_error()))
}
