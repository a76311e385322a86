pub mod scrub;
