// src/crawl/progress.rs
// =============================================================================
// Progress output: one line per BFS step.
//
//   <step> | <frontier> | <new>/<total> (<percent>%) | <route> -> [<children>]
//
// Lines longer than the terminal are cut and end with "... <full length>",
// so each step stays on one row even for pages with hundreds of links.
// =============================================================================

use crossterm::terminal;

// Width used when stdout isn't a terminal (pipes, CI logs)
const FALLBACK_WIDTH: usize = 80;

// What the driver tells the reporter after each processed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: usize,
    pub frontier: usize,
    pub new_children: usize,
    pub total_children: usize,
    pub route: Vec<String>,
    pub child_titles: Vec<String>,
}

impl StepRecord {
    pub fn percent_new(&self) -> f64 {
        if self.total_children == 0 {
            0.0
        } else {
            100.0 * self.new_children as f64 / self.total_children as f64
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{} | {} | {}/{} ({:.0}%) | {} -> [{}]",
            self.step,
            self.frontier,
            self.new_children,
            self.total_children,
            self.percent_new(),
            format_route(&self.route),
            self.child_titles.join(", ")
        )
    }
}

// Joins titles the way the final answer is printed: "A -> B -> C"
pub fn format_route(route: &[String]) -> String {
    route.join(" -> ")
}

// Prints step records, one line each, fitted to the terminal width
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    width: usize,
}

impl ProgressReporter {
    // Reads the terminal width once; the crawl doesn't react to resizes
    pub fn for_terminal() -> Self {
        let width = terminal::size()
            .map(|(columns, _rows)| columns as usize)
            .ok()
            .filter(|columns| *columns > 0)
            .unwrap_or(FALLBACK_WIDTH);
        Self::with_width(width)
    }

    pub fn with_width(width: usize) -> Self {
        Self { width }
    }

    pub fn line(&self, record: &StepRecord) -> String {
        fit_to_width(&record.render(), self.width)
    }

    pub fn report(&self, record: &StepRecord) {
        println!("{}", self.line(record));
    }
}

// Cuts `text` to `width` characters, ending with "... <original length>"
fn fit_to_width(text: &str, width: usize) -> String {
    let length = text.chars().count();
    if length <= width {
        return text.to_string();
    }

    let marker = format!("... {}", length);
    let keep = width.saturating_sub(marker.chars().count());
    let mut fitted: String = text.chars().take(keep).collect();
    fitted.push_str(&marker);
    fitted
}
