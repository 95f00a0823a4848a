use crate::client::{get_bool, get_str, opt_str, ApiClient, ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

pub const PREVIEW_TIMEOUT: Duration = Duration::from_secs(60);
pub const FULL_TIMEOUT: Duration = Duration::from_secs(300);

/// Body of `POST compile_preview/`.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewRequest<'a> {
    pub content: &'a str,
    pub timeout: u64,
    pub color_mode: &'a str,
    pub section_name: &'a str,
}

/// Preview outcome. A failed compilation is a distinguished value carrying
/// the log, not an error; the user fixes the source and retries.
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    pub success: bool,
    pub pdf: Option<String>,
    pub log: String,
    pub log_html: Option<String>,
}

/// Body of `POST compile_full/`.
#[derive(Debug, Clone, Serialize)]
pub struct FullCompileOptions {
    pub doc_type: String,
    pub timeout: u64,
    pub no_figs: bool,
    pub ppt2tif: bool,
    pub crop_tif: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub force: bool,
}

impl Default for FullCompileOptions {
    fn default() -> Self {
        Self {
            doc_type: "manuscript".to_string(),
            timeout: FULL_TIMEOUT.as_secs(),
            no_figs: false,
            ppt2tif: false,
            crop_tif: false,
            quiet: true,
            verbose: false,
            force: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FullOutcome {
    pub pdf: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Transient job state returned by the status route. Never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilationJob {
    #[serde(default)]
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output_pdf: Option<String>,
}

impl ApiClient {
    /// Fast inline-content build for live-typing feedback. Returns
    /// `Ok(None)` without issuing a request while a compilation is in
    /// flight, and on a malformed response body (logged).
    pub fn compile_preview(
        &self,
        content: &str,
        section_name: &str,
        color_mode: &str,
    ) -> ApiResult<Option<PreviewOutcome>> {
        let Some(_guard) = self.begin_compile() else {
            return Ok(None);
        };

        let request = PreviewRequest {
            content,
            timeout: PREVIEW_TIMEOUT.as_secs(),
            color_mode,
            section_name,
        };

        let body: Value = self
            .http()
            .post(self.url("compile_preview/"))
            .timeout(PREVIEW_TIMEOUT)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        match parse_preview(&body) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) => {
                eprintln!("Warning: ignoring preview response: {}", err);
                Ok(None)
            }
        }
    }

    /// Full workspace build. Either completes inline or returns a job id
    /// that is polled at a fixed interval until the attempt budget runs
    /// out. `progress` is invoked with each observed job state.
    pub fn compile_full(
        &self,
        options: &FullCompileOptions,
        mut progress: impl FnMut(&CompilationJob),
    ) -> ApiResult<Option<FullOutcome>> {
        let Some(_guard) = self.begin_compile() else {
            return Ok(None);
        };

        let body: Value = self
            .http()
            .post(self.url("compile_full/"))
            .timeout(FULL_TIMEOUT)
            .json(options)
            .send()?
            .error_for_status()?
            .json()?;

        // A job id means the build was queued; otherwise it completed inline.
        if let Some(job_id) = opt_str(&body, "job_id") {
            return self.poll_job(&job_id, &mut progress).map(Some);
        }

        if get_bool(&body, "success")? {
            return Ok(Some(FullOutcome {
                pdf: get_str(&body, "output_pdf")?,
            }));
        }

        Err(ApiError::Backend(
            opt_str(&body, "log").unwrap_or_else(|| "compilation failed".to_string()),
        ))
    }

    /// Fixed-delay status polling; fetch failures retry on the same delay
    /// and count against the attempt budget.
    fn poll_job(
        &self,
        job_id: &str,
        progress: &mut impl FnMut(&CompilationJob),
    ) -> ApiResult<FullOutcome> {
        let url = self.url(&format!("compilation/status/{}/", job_id));

        for attempt in 0..self.max_poll_attempts() {
            if attempt > 0 {
                thread::sleep(self.poll_interval());
            }

            let job: CompilationJob = match self
                .http()
                .get(&url)
                .timeout(self.poll_interval() * 10)
                .send()
                .and_then(|resp| resp.error_for_status())
                .and_then(|resp| resp.json())
            {
                Ok(job) => job,
                Err(err) => {
                    eprintln!("Warning: status poll failed (attempt {}): {}", attempt + 1, err);
                    continue;
                }
            };

            progress(&job);

            match job.status {
                JobStatus::Completed => {
                    return Ok(FullOutcome {
                        pdf: job.output_pdf.unwrap_or_default(),
                    });
                }
                JobStatus::Failed => {
                    return Err(ApiError::Backend(
                        job.error.unwrap_or_else(|| "compilation failed".to_string()),
                    ));
                }
                JobStatus::Pending | JobStatus::Processing => {}
            }
        }

        Err(ApiError::PollTimeout {
            attempts: self.max_poll_attempts(),
        })
    }

    /// Post all non-empty section contents in one request.
    pub fn save_sections(
        &self,
        sections: &BTreeMap<String, String>,
        doc_type: &str,
    ) -> ApiResult<()> {
        let body: Value = self
            .http()
            .post(self.url("save-sections/"))
            .json(&serde_json::json!({
                "sections": sections,
                "doc_type": doc_type,
            }))
            .send()?
            .error_for_status()?
            .json()?;

        if get_bool(&body, "success")? {
            Ok(())
        } else {
            Err(ApiError::Backend(
                opt_str(&body, "error").unwrap_or_else(|| "save failed".to_string()),
            ))
        }
    }
}

fn parse_preview(body: &Value) -> ApiResult<PreviewOutcome> {
    let success = get_bool(body, "success")?;
    // The backend uses output_pdf or pdf_path depending on the build route.
    let pdf = opt_str(body, "output_pdf").or_else(|| opt_str(body, "pdf_path"));

    if success && pdf.is_none() {
        return Err(ApiError::Shape("output_pdf"));
    }

    Ok(PreviewOutcome {
        success,
        pdf,
        log: opt_str(body, "log").unwrap_or_default(),
        log_html: opt_str(body, "log_html"),
    })
}
