pub mod football_api;
