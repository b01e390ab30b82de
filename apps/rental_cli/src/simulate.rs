//! Replays a click sequence against a live selection controller.

use std::str::FromStr;

use anyhow::{anyhow, bail};
use map_core::{MapError, MapEvent, MarkerSelectionController, ScreenPoint, Selection};
use shared::domain::PropertyId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Click the marker of this property.
    Marker(PropertyId),
    /// Click empty map.
    Background,
    /// Click a raw screen point, `@x,y`.
    Point(ScreenPoint),
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("bg") || s.eq_ignore_ascii_case("background") {
            return Ok(Action::Background);
        }
        if let Some(point) = s.strip_prefix('@') {
            let (x, y) = point
                .split_once(',')
                .ok_or_else(|| anyhow!("expected @x,y but got '{s}'"))?;
            return Ok(Action::Point(ScreenPoint::new(x.trim().parse()?, y.trim().parse()?)));
        }
        match s.parse::<i64>() {
            Ok(id) => Ok(Action::Marker(PropertyId(id))),
            Err(_) => bail!("unknown action '{s}': use a property id, 'bg' or '@x,y'"),
        }
    }
}

/// One line of simulation output.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub action: String,
    pub selection: Selection,
    pub popup: Option<String>,
}

pub fn apply(controller: &mut MarkerSelectionController, action: Action) -> Result<Step, MapError> {
    let label = match action {
        Action::Marker(id) => {
            let handle = controller
                .marker_for(id)
                .ok_or(MapError::UnknownProperty(id))?;
            controller.handle_event(MapEvent::MarkerClicked(handle))?;
            format!("click marker {id}")
        }
        Action::Background => {
            controller.handle_event(MapEvent::BackgroundClicked)?;
            "click background".to_string()
        }
        Action::Point(point) => match controller.click(point)? {
            MapEvent::MarkerClicked(_) => format!("click ({:.0}, {:.0}) on a marker", point.x, point.y),
            MapEvent::BackgroundClicked => format!("click ({:.0}, {:.0}) on the map", point.x, point.y),
        },
    };
    Ok(Step {
        action: label,
        selection: controller.selection(),
        popup: controller
            .popup()
            .map(|popup| format!("{} · {} · {}", popup.name, popup.price, popup.address)),
    })
}
