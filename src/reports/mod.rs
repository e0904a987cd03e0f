//! Report renderers: the same score rows formatted three ways (worksheet,
//! PDF, HTML email body). Renderers take plain row data and never touch the
//! store.

pub mod excel;
pub mod pdf;
pub mod email;

/// One row of a weekly report: employee identity plus the four raw metrics
/// and the derived productivity score.
#[derive(Debug, Clone)]
pub struct ScoreRow {
    pub employee_id: i64,
    pub employee_name: String,
    pub task_completion: f64,
    pub speed: f64,
    pub professionalism: f64,
    pub activity: f64,
    pub productivity_score: f64,
}
