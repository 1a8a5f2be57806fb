use crate::json::curvejson::curve_from_json;
use crate::manager::manager::Manager;
use crate::minplusalgebra::curve::Curve;

/// Catalog of curves, each entry a tagged curve object with a `name`.
pub struct CurveManager;

impl CurveManager {
    pub fn new() -> Manager<Curve> {
        Manager::new(curve_from_json)
    }
}
