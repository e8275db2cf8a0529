pub mod trip_routes;
