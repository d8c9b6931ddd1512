use actix_web::HttpResponse;
use serde::Serialize;
use serde_json::json;

const SERVICE_NAME: &str = "odyssey-api";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct RouteDoc {
    method: &'static str,
    path: &'static str,
    auth: bool,
    summary: &'static str,
}

const ROUTES: &[RouteDoc] = &[
    RouteDoc { method: "GET", path: "/health", auth: false, summary: "Health check" },
    RouteDoc { method: "GET", path: "/metrics", auth: false, summary: "Prometheus metrics" },
    RouteDoc { method: "POST", path: "/api/v1/auth/register", auth: false, summary: "Create an account and return a token" },
    RouteDoc { method: "POST", path: "/api/v1/auth/login", auth: false, summary: "Exchange credentials for a token" },
    RouteDoc { method: "GET", path: "/api/v1/auth/me", auth: true, summary: "Current user" },
    RouteDoc { method: "GET", path: "/api/v1/trips", auth: true, summary: "List trips (page, page_size, status)" },
    RouteDoc { method: "POST", path: "/api/v1/trips", auth: true, summary: "Create a trip" },
    RouteDoc { method: "GET", path: "/api/v1/trips/{trip_id}", auth: true, summary: "Get a trip" },
    RouteDoc { method: "PATCH", path: "/api/v1/trips/{trip_id}", auth: true, summary: "Update a trip" },
    RouteDoc { method: "DELETE", path: "/api/v1/trips/{trip_id}", auth: true, summary: "Delete a trip with everything attached to it" },
    RouteDoc { method: "GET", path: "/api/v1/activities", auth: true, summary: "List a trip's activities (trip_id)" },
    RouteDoc { method: "POST", path: "/api/v1/activities", auth: true, summary: "Create an activity" },
    RouteDoc { method: "PUT", path: "/api/v1/activities/reorder", auth: true, summary: "Bulk update sort order (trip_id)" },
    RouteDoc { method: "GET", path: "/api/v1/activities/{activity_id}", auth: true, summary: "Get an activity" },
    RouteDoc { method: "PATCH", path: "/api/v1/activities/{activity_id}", auth: true, summary: "Update an activity" },
    RouteDoc { method: "DELETE", path: "/api/v1/activities/{activity_id}", auth: true, summary: "Delete an activity" },
    RouteDoc { method: "GET", path: "/api/v1/memories", auth: true, summary: "List a trip's memories (trip_id)" },
    RouteDoc { method: "POST", path: "/api/v1/memories", auth: true, summary: "Upload a photo memory (multipart)" },
    RouteDoc { method: "GET", path: "/api/v1/memories/{memory_id}", auth: true, summary: "Get a memory" },
    RouteDoc { method: "DELETE", path: "/api/v1/memories/{memory_id}", auth: true, summary: "Delete a memory" },
    RouteDoc { method: "GET", path: "/api/v1/expenses", auth: true, summary: "List a trip's expenses (trip_id, category)" },
    RouteDoc { method: "POST", path: "/api/v1/expenses", auth: true, summary: "Record an expense" },
    RouteDoc { method: "GET", path: "/api/v1/expenses/summary", auth: true, summary: "Spending by category and currency (trip_id)" },
    RouteDoc { method: "GET", path: "/api/v1/expenses/{expense_id}", auth: true, summary: "Get an expense" },
    RouteDoc { method: "PATCH", path: "/api/v1/expenses/{expense_id}", auth: true, summary: "Update an expense" },
    RouteDoc { method: "DELETE", path: "/api/v1/expenses/{expense_id}", auth: true, summary: "Delete an expense" },
    RouteDoc { method: "GET", path: "/api/v1/packing", auth: true, summary: "List a trip's packing items (trip_id, category)" },
    RouteDoc { method: "POST", path: "/api/v1/packing", auth: true, summary: "Add a packing item" },
    RouteDoc { method: "GET", path: "/api/v1/packing/progress", auth: true, summary: "Packed share overall and per category (trip_id)" },
    RouteDoc { method: "POST", path: "/api/v1/packing/bulk-toggle", auth: true, summary: "Set is_packed on several items (trip_id)" },
    RouteDoc { method: "PUT", path: "/api/v1/packing/reorder", auth: true, summary: "Bulk update sort order (trip_id)" },
    RouteDoc { method: "GET", path: "/api/v1/packing/{item_id}", auth: true, summary: "Get a packing item" },
    RouteDoc { method: "PATCH", path: "/api/v1/packing/{item_id}", auth: true, summary: "Update a packing item" },
    RouteDoc { method: "DELETE", path: "/api/v1/packing/{item_id}", auth: true, summary: "Delete a packing item" },
    RouteDoc { method: "POST", path: "/api/v1/packing/{item_id}/toggle", auth: true, summary: "Flip is_packed" },
    RouteDoc { method: "GET", path: "/api/v1/statistics", auth: true, summary: "Lifetime travel statistics" },
    RouteDoc { method: "GET", path: "/api/v1/statistics/year-in-review", auth: true, summary: "One year's trips and spending (year)" },
    RouteDoc { method: "GET", path: "/api/v1/statistics/timeline", auth: true, summary: "Trips by start date with counts (limit, offset)" },
    RouteDoc { method: "POST", path: "/api/v1/seed/demo-data", auth: true, summary: "Generate sample trips" },
];

// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": VERSION,
    }))
}

// GET /
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to Odyssey API",
        "version": VERSION,
        "docs": "/docs",
        "health": "/health",
    }))
}

// GET /docs
pub async fn docs() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": SERVICE_NAME,
        "version": VERSION,
        "auth": "Bearer token from /api/v1/auth/login or /api/v1/auth/register",
        "routes": ROUTES,
    }))
}
