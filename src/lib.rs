pub mod configuration;

pub mod json {
    pub mod curvejson;
}

pub mod manager {
    pub mod namedobject;
    pub mod managererror;
    pub mod manager;
    pub mod curvemanager;
}

pub mod minplusalgebra {
    pub mod curveerror;
    pub mod computationsettings;
    pub mod point;
    pub mod segment;
    pub mod element;
    pub mod sequence;
    pub mod interval;
    pub mod curve;
    pub mod optimization;
    pub mod pointwiseoperations;
    pub mod convolution;
    pub mod deconvolution;
    pub mod pseudoinverse;
    pub mod composition;
}

pub mod networkcalculus {
    pub mod curvefamily;
    pub mod ratelatencyservicecurve;
    pub mod sigmarhoarrivalcurve;
    pub mod delayservicecurve;
    pub mod stepcurve;
    pub mod staircurve;
    pub mod staircasecurve;
    pub mod flowcontrolcurve;
    pub mod namedcurve;
}

pub mod numerics {
    pub mod rationalerror;
    pub mod rational;
}
