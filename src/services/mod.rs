pub mod composer;
pub mod cost_service;
pub mod hotel_link_service;
pub mod place_service;
