pub mod providers;
pub mod recommendations;
pub mod track_search;
