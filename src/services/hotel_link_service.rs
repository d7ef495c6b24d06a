use std::collections::HashMap;

use url::Url;

use crate::models::trip::{BookingSite, TripHotelSearch};

/// Builds hotel-booking search links for the supported reservation sites.
/// Destination strings are Korean place names, so every URL goes through
/// the `url` crate for encoding.
pub struct HotelLinkService;

impl HotelLinkService {
    /// Per-site search links for a specific stay, optionally narrowed to a
    /// hotel name.
    pub fn booking_links(
        destination: &str,
        check_in: &str,
        check_out: &str,
        guests: u32,
        rooms: u32,
        hotel_name: Option<&str>,
    ) -> HashMap<String, BookingSite> {
        let mut links = HashMap::new();

        let mut hotels = Url::parse("https://kr.hotels.com/Hotel-Search").unwrap();
        hotels
            .query_pairs_mut()
            .append_pair("destination", destination)
            .append_pair("flexibility", "0_DAY")
            .append_pair("d1", check_in)
            .append_pair("startDate", check_in)
            .append_pair("d2", check_out)
            .append_pair("endDate", check_out)
            .append_pair("adults", &guests.to_string())
            .append_pair("rooms", &rooms.to_string());
        if let Some(name) = hotel_name {
            hotels.query_pairs_mut().append_pair("q", name);
        }
        links.insert(
            "hotels".to_string(),
            BookingSite {
                name: "호텔스닷컴".to_string(),
                url: hotels.to_string(),
                icon: "🏨".to_string(),
                description: None,
            },
        );

        let mut airbnb = Url::parse("https://www.airbnb.co.kr/s").unwrap();
        airbnb
            .path_segments_mut()
            .unwrap()
            .push(destination)
            .push("homes");
        airbnb
            .query_pairs_mut()
            .append_pair("checkin", check_in)
            .append_pair("checkout", check_out)
            .append_pair("adults", &guests.to_string())
            .append_pair("children", "0")
            .append_pair("infants", "0")
            .append_pair("pets", "0");
        links.insert(
            "airbnb".to_string(),
            BookingSite {
                name: "에어비앤비".to_string(),
                url: airbnb.to_string(),
                icon: "🏠".to_string(),
                description: None,
            },
        );

        let mut agoda = Url::parse("https://www.agoda.com/ko-kr/search").unwrap();
        agoda
            .query_pairs_mut()
            .append_pair("textToSearch", destination)
            .append_pair("checkIn", check_in)
            .append_pair("checkOut", check_out)
            .append_pair("rooms", &rooms.to_string())
            .append_pair("adults", &guests.to_string())
            .append_pair("children", "0")
            .append_pair("locale", "ko-kr")
            .append_pair("currency", "KRW")
            .append_pair("travellerType", "1");
        if let Some(name) = hotel_name {
            agoda.query_pairs_mut().append_pair("hotelName", name);
        }
        links.insert(
            "agoda".to_string(),
            BookingSite {
                name: "아고다".to_string(),
                url: agoda.to_string(),
                icon: "🛏️".to_string(),
                description: None,
            },
        );

        let mut booking = Url::parse("https://www.booking.com/searchresults.html").unwrap();
        booking
            .query_pairs_mut()
            .append_pair("ss", destination)
            .append_pair("checkin", check_in)
            .append_pair("checkout", check_out)
            .append_pair("group_adults", &guests.to_string())
            .append_pair("no_rooms", &rooms.to_string());
        if let Some(name) = hotel_name {
            booking.query_pairs_mut().append_pair("hotelName", name);
        }
        links.insert(
            "booking".to_string(),
            BookingSite {
                name: "부킹닷컴".to_string(),
                url: booking.to_string(),
                icon: "📅".to_string(),
                description: None,
            },
        );

        links
    }

    /// Trip-wide hotel search block attached to every generated plan.
    pub fn trip_hotel_search(
        destination: &str,
        check_in: &str,
        check_out: &str,
        guests: u32,
        rooms: u32,
    ) -> TripHotelSearch {
        let mut search_links = Self::booking_links(destination, check_in, check_out, guests, rooms, None);
        for (key, site) in search_links.iter_mut() {
            let verb = if key == "airbnb" { "숙소" } else { "호텔" };
            site.description = Some(format!("{}에서 {} 검색하기", site.name, verb));
        }
        // agoda is not part of the trip-wide block; 여기어때 is
        search_links.remove("agoda");

        let mut yeogi = Url::parse("https://www.yeogi.com/domestic-accommodations").unwrap();
        yeogi
            .query_pairs_mut()
            .append_pair("keyword", destination)
            .append_pair("checkIn", check_in)
            .append_pair("checkOut", check_out)
            .append_pair("personal", &guests.to_string())
            .append_pair("freeForm", "false");
        search_links.insert(
            "yeogi".to_string(),
            BookingSite {
                name: "여기어때".to_string(),
                url: yeogi.to_string(),
                icon: "🏨".to_string(),
                description: Some("여기어때에서 호텔 검색하기".to_string()),
            },
        );

        TripHotelSearch {
            destination: destination.to_string(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            guests,
            rooms,
            search_links,
        }
    }
}
