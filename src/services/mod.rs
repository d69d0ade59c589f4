pub mod currency;
pub mod lottie_service;
pub mod report_pdf;
pub mod roi_engine;
