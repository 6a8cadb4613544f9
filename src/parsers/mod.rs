pub mod detail;


pub use detail::extract as extract_detail;
