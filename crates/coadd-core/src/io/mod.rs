pub mod fits;
