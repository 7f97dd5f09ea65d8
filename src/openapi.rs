use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ErrorResponse;
use crate::weather::models::{
    ConditionsBlock, ForecastBlock, MetricDisplay, MetricKey, TemperatureBlock, WeatherPayload,
};

/// OpenAPI documentation for the Skyline API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Skyline API",
        version = "1.0.0",
        description = "Current conditions, today's forecast and location from AccuWeather, merged into one payload for a frontend.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(crate::weather::handlers::get_weather),
    tags(
        (name = "weather", description = "Normalized weather payload")
    ),
    components(
        schemas(
            ErrorResponse,
            WeatherPayload,
            TemperatureBlock,
            ConditionsBlock,
            ForecastBlock,
            MetricDisplay,
            MetricKey,
        )
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
