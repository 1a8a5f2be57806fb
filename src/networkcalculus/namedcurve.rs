use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::networkcalculus::curvefamily::CurveFamily;
use crate::networkcalculus::delayservicecurve::DelayServiceCurve;
use crate::networkcalculus::flowcontrolcurve::FlowControlCurve;
use crate::networkcalculus::ratelatencyservicecurve::RateLatencyServiceCurve;
use crate::networkcalculus::sigmarhoarrivalcurve::SigmaRhoArrivalCurve;
use crate::networkcalculus::staircasecurve::StaircaseCurve;
use crate::networkcalculus::staircurve::StairCurve;
use crate::networkcalculus::stepcurve::StepCurve;

/// Any of the named families, kept in parametric form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamedCurve {
    RateLatency(RateLatencyServiceCurve),
    SigmaRho(SigmaRhoArrivalCurve),
    Delay(DelayServiceCurve),
    Step(StepCurve),
    Stair(StairCurve),
    Staircase(StaircaseCurve),
    FlowControl(FlowControlCurve)
}

impl NamedCurve {
    fn family(&self) -> &dyn CurveFamily {
        match self {
            NamedCurve::RateLatency(curve) => curve,
            NamedCurve::SigmaRho(curve) => curve,
            NamedCurve::Delay(curve) => curve,
            NamedCurve::Step(curve) => curve,
            NamedCurve::Stair(curve) => curve,
            NamedCurve::Staircase(curve) => curve,
            NamedCurve::FlowControl(curve) => curve
        }
    }
}

impl CurveFamily for NamedCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        self.family().to_curve()
    }

    fn type_name(&self) -> &'static str {
        self.family().type_name()
    }
}

impl From<RateLatencyServiceCurve> for NamedCurve {
    fn from(curve: RateLatencyServiceCurve) -> NamedCurve {
        NamedCurve::RateLatency(curve)
    }
}

impl From<SigmaRhoArrivalCurve> for NamedCurve {
    fn from(curve: SigmaRhoArrivalCurve) -> NamedCurve {
        NamedCurve::SigmaRho(curve)
    }
}

impl From<DelayServiceCurve> for NamedCurve {
    fn from(curve: DelayServiceCurve) -> NamedCurve {
        NamedCurve::Delay(curve)
    }
}

impl From<StepCurve> for NamedCurve {
    fn from(curve: StepCurve) -> NamedCurve {
        NamedCurve::Step(curve)
    }
}

impl From<StairCurve> for NamedCurve {
    fn from(curve: StairCurve) -> NamedCurve {
        NamedCurve::Stair(curve)
    }
}

impl From<StaircaseCurve> for NamedCurve {
    fn from(curve: StaircaseCurve) -> NamedCurve {
        NamedCurve::Staircase(curve)
    }
}

impl From<FlowControlCurve> for NamedCurve {
    fn from(curve: FlowControlCurve) -> NamedCurve {
        NamedCurve::FlowControl(curve)
    }
}
