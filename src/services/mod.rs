pub mod forecast;
pub mod openweather;
