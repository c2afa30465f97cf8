pub(crate) mod blur;
pub(crate) mod chroma;
pub(crate) mod composite;
pub(crate) mod mask;
pub(crate) mod reframe;
pub(crate) mod resample;
