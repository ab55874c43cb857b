use crate::aggregation::{
    AveragingWindow, Extremum, extremum, latest, moving_average, trailing_average,
};
use crate::models::{AxisResponse, Person, SummaryResponse, WeightPoint};
use crate::state::ViewSettings;

pub fn build_summary(
    person: Person,
    series: &[WeightPoint],
    view: ViewSettings,
) -> SummaryResponse {
    let window = view.window.as_usize();

    SummaryResponse {
        person: person.id().to_string(),
        label: person.label().to_string(),
        color: person.color().to_string(),
        series: series.to_vec(),
        moving_average: moving_average(series, window).unwrap_or_default(),
        latest: latest(series),
        average: trailing_average(series, window).ok().flatten(),
        max: extremum(series, Extremum::Max).map(|point| point.weight),
        min: extremum(series, Extremum::Min).map(|point| point.weight),
        window: view.window.days(),
        windows: AveragingWindow::CHOICES.to_vec(),
        axis: AxisResponse {
            min: view.axis.min,
            max: view.axis.max,
            stride: view.axis.stride(),
        },
    }
}
