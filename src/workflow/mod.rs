pub mod acquisition_flow;
pub mod vendor_ctx;

pub use acquisition_flow::AcquisitionFlow;
pub use vendor_ctx::VendorCtx;
