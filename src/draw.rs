pub(crate) mod context;
pub(crate) mod coverage;
pub(crate) mod cpu;
pub(crate) mod gradient;
pub(crate) mod text;
