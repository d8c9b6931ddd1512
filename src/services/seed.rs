use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::Rng;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::activity::{ActivityCategory, NewActivity};
use crate::models::memory::NewMemory;
use crate::models::trip::{NewTrip, TripStatus};

const DEMO_TRIP_COUNT: usize = 5;

// (city, country, latitude, longitude)
const CITIES: [(&str, &str, f64, f64); 8] = [
    ("Lisbon", "Portugal", 38.7223, -9.1393),
    ("Kyoto", "Japan", 35.0116, 135.7681),
    ("Reykjavik", "Iceland", 64.1466, -21.9426),
    ("Cape Town", "South Africa", -33.9249, 18.4241),
    ("Oaxaca", "Mexico", 17.0732, -96.7266),
    ("Hanoi", "Vietnam", 21.0278, 105.8342),
    ("Edinburgh", "Scotland", 55.9533, -3.1883),
    ("Queenstown", "New Zealand", -45.0312, 168.6626),
];

const TRIP_IMAGES: [&str; 6] = [
    "https://images.unsplash.com/photo-1469474968028-56623f02e42e?w=800",
    "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=800",
    "https://images.unsplash.com/photo-1510414842594-a61c69b5ae57?w=800",
    "https://images.unsplash.com/photo-1476514525535-07fb3b4ae5f1?w=800",
    "https://images.unsplash.com/photo-1502602898657-3e91760cbb34?w=800",
    "https://images.unsplash.com/photo-1504019347908-b45f9b0b8dd5?w=800",
];

const MEMORY_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1488085061387-422e29b40080?w=400",
    "https://images.unsplash.com/photo-1464207687429-7505649dae38?w=400",
    "https://images.unsplash.com/photo-1506929562872-bb421503ef21?w=400",
    "https://images.unsplash.com/photo-1519904981063-b0cf448d479e?w=400",
    "https://images.unsplash.com/photo-1493246507139-91e8fad9978e?w=400",
];

const TAGS: [&str; 10] = [
    "food", "hiking", "beach", "culture", "nightlife", "museums", "roadtrip", "photography",
    "family", "budget",
];

const ACTIVITY_TITLES: [(&str, ActivityCategory); 12] = [
    ("Street food crawl", ActivityCategory::Food),
    ("Dinner at a local favourite", ActivityCategory::Food),
    ("Morning market breakfast", ActivityCategory::Food),
    ("Train to the coast", ActivityCategory::Travel),
    ("Airport transfer", ActivityCategory::Travel),
    ("Scenic ferry ride", ActivityCategory::Travel),
    ("Check in at the guesthouse", ActivityCategory::Stay),
    ("Night at a boutique hotel", ActivityCategory::Stay),
    ("Old town walking tour", ActivityCategory::Explore),
    ("Sunrise viewpoint hike", ActivityCategory::Explore),
    ("Museum afternoon", ActivityCategory::Explore),
    ("Hidden garden visit", ActivityCategory::Explore),
];

const CAPTIONS: [&str; 8] = [
    "Golden hour over the rooftops",
    "Best meal of the trip",
    "Lost in the side streets",
    "The view was worth the climb",
    "Rainy day, still smiling",
    "Found this place by accident",
    "Last evening here",
    "Postcard-perfect",
];

const DESCRIPTIONS: [&str; 4] = [
    "A slow trip with plenty of time for wandering and long lunches.",
    "Packed itinerary, early mornings and late nights.",
    "Mostly outdoors, chasing views and good weather.",
    "Food first, sightseeing second.",
];

/// One generated trip with its dependents, ready to insert.
#[derive(Debug)]
pub struct DemoTrip {
    pub id: Uuid,
    pub trip: NewTrip,
    pub activities: Vec<NewActivity>,
    pub memories: Vec<NewMemory>,
}

#[derive(Serialize, Debug)]
pub struct CreatedTrip {
    pub id: Uuid,
    pub title: String,
    pub status: TripStatus,
}

#[derive(Serialize, Debug)]
pub struct SeedSummary {
    pub message: String,
    pub created_trips: Vec<CreatedTrip>,
    pub total_trips: usize,
    pub total_activities: usize,
    pub total_memories: usize,
}

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn jitter<R: Rng>(rng: &mut R, value: f64, bound: f64) -> f64 {
    (value + rng.gen_range(-0.05..0.05)).clamp(-bound, bound)
}

fn random_moment<R: Rng>(
    rng: &mut R,
    start: NaiveDate,
    days: i64,
    hours: std::ops::RangeInclusive<u32>,
) -> chrono::DateTime<Utc> {
    let date = start + Duration::days(rng.gen_range(0..=days));
    let minute = *pick(rng, &[0u32, 15, 30, 45]);
    let time = NaiveTime::from_hms_opt(rng.gen_range(hours), minute, 0).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(time))
}

/// Builds five trips around `today` from the fixed sample lists.
pub fn build_demo_trips<R: Rng>(rng: &mut R, today: NaiveDate) -> Vec<DemoTrip> {
    (0..DEMO_TRIP_COUNT)
        .map(|_| {
            let id = Uuid::now_v7();
            let (city, country, lat, lon) = *pick(rng, &CITIES);
            let start_date = today + Duration::days(rng.gen_range(-180..=180));
            let days = rng.gen_range(3..=14);
            let end_date = start_date + Duration::days(days);

            let mut tags: Vec<String> = Vec::new();
            while tags.len() < 3 {
                let tag = pick(rng, &TAGS).to_string();
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }

            let trip = NewTrip {
                title: format!("{} Adventure", city),
                description: Some(format!("{} Exploring {}.", pick(rng, &DESCRIPTIONS), country)),
                cover_image_url: Some(pick(rng, &TRIP_IMAGES).to_string()),
                start_date,
                end_date: Some(end_date),
                status: *pick(rng, TripStatus::ALL),
                tags,
            };

            let activities = (0..rng.gen_range(3..=5))
                .map(|_| {
                    let (title, category) = *pick(rng, &ACTIVITY_TITLES);
                    NewActivity {
                        trip_id: id,
                        title: title.to_string(),
                        description: Some(format!("{} in {}", title, city)),
                        scheduled_time: random_moment(rng, start_date, days, 8..=20),
                        category,
                        latitude: Some(jitter(rng, lat, 90.0)),
                        longitude: Some(jitter(rng, lon, 180.0)),
                    }
                })
                .collect();

            let memories = (0..rng.gen_range(2..=4))
                .map(|_| NewMemory {
                    trip_id: id,
                    photo_url: pick(rng, &MEMORY_IMAGES).to_string(),
                    latitude: jitter(rng, lat, 90.0),
                    longitude: jitter(rng, lon, 180.0),
                    caption: Some(pick(rng, &CAPTIONS).to_string()),
                    taken_at: Some(random_moment(rng, start_date, days, 9..=18)),
                })
                .collect();

            DemoTrip {
                id,
                trip,
                activities,
                memories,
            }
        })
        .collect()
}

/// Inserts the generated trips for `user_id` in a single transaction.
pub async fn insert_demo_trips(
    pool: &PgPool,
    user_id: Uuid,
    demo_trips: Vec<DemoTrip>,
) -> Result<SeedSummary, AppError> {
    let mut tx = pool.begin().await?;
    let mut created_trips = Vec::with_capacity(demo_trips.len());
    let mut total_activities = 0;
    let mut total_memories = 0;

    for demo in demo_trips {
        sqlx::query(
            "INSERT INTO trips (id, user_id, title, description, cover_image_url, start_date, end_date, status, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())",
        )
        .bind(demo.id)
        .bind(user_id)
        .bind(&demo.trip.title)
        .bind(&demo.trip.description)
        .bind(&demo.trip.cover_image_url)
        .bind(demo.trip.start_date)
        .bind(demo.trip.end_date)
        .bind(demo.trip.status)
        .bind(&demo.trip.tags)
        .execute(&mut *tx)
        .await?;

        for (sort_order, activity) in demo.activities.iter().enumerate() {
            sqlx::query(
                "INSERT INTO activities (id, trip_id, title, description, scheduled_time, category, latitude, longitude, sort_order, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW(), NOW())",
            )
            .bind(Uuid::now_v7())
            .bind(demo.id)
            .bind(&activity.title)
            .bind(&activity.description)
            .bind(activity.scheduled_time)
            .bind(activity.category)
            .bind(activity.latitude)
            .bind(activity.longitude)
            .bind(sort_order as i32)
            .execute(&mut *tx)
            .await?;
        }

        for memory in &demo.memories {
            sqlx::query(
                "INSERT INTO memories (id, trip_id, photo_url, latitude, longitude, caption, taken_at, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())",
            )
            .bind(Uuid::now_v7())
            .bind(demo.id)
            .bind(&memory.photo_url)
            .bind(memory.latitude)
            .bind(memory.longitude)
            .bind(&memory.caption)
            .bind(memory.taken_at)
            .execute(&mut *tx)
            .await?;
        }

        total_activities += demo.activities.len();
        total_memories += demo.memories.len();
        created_trips.push(CreatedTrip {
            id: demo.id,
            title: demo.trip.title,
            status: demo.trip.status,
        });
    }

    tx.commit().await?;

    Ok(SeedSummary {
        message: "Demo data created successfully".to_string(),
        total_trips: created_trips.len(),
        created_trips,
        total_activities,
        total_memories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn generate(seed: u64) -> Vec<DemoTrip> {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        build_demo_trips(&mut StdRng::seed_from_u64(seed), today)
    }

    #[test]
    fn builds_five_trips_with_bounded_children() {
        for seed in 0..20 {
            let trips = generate(seed);
            assert_eq!(trips.len(), 5);
            for demo in &trips {
                assert!((3..=5).contains(&demo.activities.len()));
                assert!((2..=4).contains(&demo.memories.len()));
                assert!(demo.activities.iter().all(|a| a.trip_id == demo.id));
                assert!(demo.memories.iter().all(|m| m.trip_id == demo.id));
            }
        }
    }

    #[test]
    fn generated_values_pass_validation() {
        for demo in generate(7) {
            assert!(demo.trip.validate_all().is_ok());
            assert_eq!(demo.trip.tags.len(), 3);
            for activity in &demo.activities {
                assert!(activity.validate_all().is_ok());
            }
        }
    }

    #[test]
    fn schedule_falls_within_trip_dates() {
        for demo in generate(42) {
            let start = demo.trip.start_date;
            let end = demo.trip.end_date.unwrap();
            for activity in &demo.activities {
                let day = activity.scheduled_time.date_naive();
                assert!(day >= start && day <= end);
            }
            for memory in &demo.memories {
                let day = memory.taken_at.unwrap().date_naive();
                assert!(day >= start && day <= end);
            }
        }
    }
}
