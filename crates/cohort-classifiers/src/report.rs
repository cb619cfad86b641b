//! Self-contained HTML summary of a training run.
use std::fs;
use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};
use serde::Serialize;

use crate::error::{ClassifierError, Result};
use crate::math::Array2;
use crate::models::{FitSummary, StopReason};
use crate::preprocessing::StandardScaler;

/// Loss values shown in the trajectory table.
const MAX_TRAJECTORY_ROWS: usize = 25;

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em; color: #222; }
table { border-collapse: collapse; margin-bottom: 1.5em; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: right; }
th { background: #f0f0f0; }
td.label, th.label { text-align: left; }
td.hit { background: #e3f4e3; font-weight: bold; }
.code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px;
  overflow-x: auto; font-family: monospace; white-space: pre-wrap; }
.warn { color: #a33; }
";

/// Inputs of the report, gathered by the training driver.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub title: String,
    pub generated_at: String,
    /// Pretty-printed JSON of the run configuration.
    pub config_json: String,
    pub classes: Vec<String>,
    pub train_counts: Vec<usize>,
    pub test_counts: Vec<usize>,
    pub accuracy: f64,
    pub confusion: Array2<usize>,
    pub fit_summary: FitSummary,
    pub feature_names: Vec<String>,
    pub scaler: StandardScaler,
    pub artifact_path: String,
}

impl TrainingReport {
    /// Serialize `config` for the configuration section.
    pub fn config_to_json<C: Serialize>(config: &C) -> String {
        serde_json::to_string_pretty(config).unwrap_or_else(|e| format!("<unavailable: {}>", e))
    }

    pub fn render(&self) -> String {
        let markup = html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    h1 { (self.title) }
                    p {
                        "Generated " (self.generated_at) ". Artifact: "
                        code { (self.artifact_path) }
                    }
                    (self.overview())
                    (self.classes_section())
                    (self.confusion_section())
                    (self.solver_section())
                    (self.scaler_section())
                    h2 { "Configuration" }
                    div class="code-container" {
                        pre { code { (self.config_json) } }
                    }
                }
            }
        };
        markup.into_string()
    }

    /// Render and write the report, creating parent directories.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ClassifierError::io(parent, source))?;
        }
        fs::write(path, self.render()).map_err(|source| ClassifierError::io(path, source))
    }

    fn overview(&self) -> Markup {
        let n_train: usize = self.train_counts.iter().sum();
        let n_test: usize = self.test_counts.iter().sum();
        html! {
            h2 { "Overview" }
            table {
                tr {
                    th class="label" { "Validation accuracy" }
                    td { (format!("{:.3}", self.accuracy)) }
                }
                tr { th class="label" { "Training rows" } td { (n_train) } }
                tr { th class="label" { "Validation rows" } td { (n_test) } }
                tr { th class="label" { "Classes" } td { (self.classes.len()) } }
            }
        }
    }

    fn classes_section(&self) -> Markup {
        html! {
            h2 { "Classes" }
            table {
                tr { th { "Code" } th class="label" { "Label" } th { "Train" } th { "Validation" } }
                @for (code, label) in self.classes.iter().enumerate() {
                    tr {
                        td { (code) }
                        td class="label" { (label) }
                        td { (self.train_counts.get(code).copied().unwrap_or(0)) }
                        td { (self.test_counts.get(code).copied().unwrap_or(0)) }
                    }
                }
            }
        }
    }

    fn confusion_section(&self) -> Markup {
        let k = self.confusion.nrows();
        html! {
            h2 { "Confusion matrix" }
            p { "Rows are true classes, columns are predictions on the validation rows." }
            table {
                tr {
                    th class="label" { "" }
                    @for label in &self.classes { th { (label) } }
                }
                @for t in 0..k {
                    tr {
                        th class="label" {
                            (self.classes.get(t).map(String::as_str).unwrap_or("?"))
                        }
                        @for p in 0..k {
                            @if t == p {
                                td class="hit" { (self.confusion[(t, p)]) }
                            } @else {
                                td { (self.confusion[(t, p)]) }
                            }
                        }
                    }
                }
            }
        }
    }

    fn solver_section(&self) -> Markup {
        let summary = &self.fit_summary;
        let history = &summary.loss_history;
        let stride = (history.len() / MAX_TRAJECTORY_ROWS).max(1);
        let mut sampled: Vec<(usize, f64)> =
            history.iter().copied().enumerate().step_by(stride).collect();
        if let Some(&last) = history.last() {
            if sampled.last().map(|(i, _)| *i) != Some(history.len() - 1) {
                sampled.push((history.len() - 1, last));
            }
        }
        html! {
            h2 { "Solver" }
            table {
                tr { th class="label" { "Iterations" } td { (summary.iterations) } }
                tr {
                    th class="label" { "Converged" }
                    @match summary.stop_reason {
                        StopReason::Converged => {
                            td { "yes" }
                        }
                        StopReason::IterationCap => {
                            td class="warn" { "no (iteration cap reached)" }
                        }
                        StopReason::LineSearchStalled => {
                            td class="warn" { "no (line search stalled)" }
                        }
                    }
                }
                tr {
                    th class="label" { "Final loss" }
                    td { (format!("{:.6}", summary.final_loss)) }
                }
                tr {
                    th class="label" { "Final gradient norm" }
                    td { (format!("{:.3e}", summary.final_gradient_norm)) }
                }
            }
            h3 { "Loss trajectory" }
            table {
                tr { th { "Iteration" } th { "Loss" } }
                @for (iteration, loss) in sampled {
                    tr { td { (iteration) } td { (format!("{:.6}", loss)) } }
                }
            }
        }
    }

    fn scaler_section(&self) -> Markup {
        html! {
            h2 { "Standardization" }
            table {
                tr { th class="label" { "Feature" } th { "Mean" } th { "Scale" } }
                @for (c, name) in self.feature_names.iter().enumerate() {
                    tr {
                        td class="label" { (name) }
                        td { (fmt_param(self.scaler.mean().get(c))) }
                        td { (fmt_param(self.scaler.scale().get(c))) }
                    }
                }
            }
        }
    }
}

fn fmt_param(value: Option<&f64>) -> String {
    format!("{:.4}", value.copied().unwrap_or(f64::NAN))
}
