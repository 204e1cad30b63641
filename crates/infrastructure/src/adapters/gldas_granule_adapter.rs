//! GLDAS granule adapter - Implements GranulePort using integration_gldas

use std::{fmt, sync::Arc};

use application::{
    error::ApplicationError,
    ports::{GranulePort, GridSample},
};
use async_trait::async_trait;
use domain::{GeoLocation, HistoryQuery, WeatherVariable};
use integration_gldas::{GldasClient, GldasConfig, GldasError, GranuleArchive};
use tracing::{debug, instrument};

/// Archive variable holding each weather variable in GLDAS_NOAH025_3H
pub const fn archive_variable(variable: WeatherVariable) -> &'static str {
    match variable {
        WeatherVariable::AirTemperature => "Tair_f_inst",
        WeatherVariable::Precipitation => "Rainf_f_tavg",
        WeatherVariable::Snowfall => "Snowf_tavg",
        WeatherVariable::WindSpeed => "Wind_f_inst",
        WeatherVariable::SolarRadiation => "SWdown_f_tavg",
        WeatherVariable::AirHumidity => "Qair_f_inst",
        WeatherVariable::SoilMoisture => "SoilMoi0_10cm_inst",
    }
}

/// Adapter for the GLDAS reanalysis archive
pub struct GldasGranuleAdapter {
    archive: Arc<dyn GranuleArchive>,
}

impl fmt::Debug for GldasGranuleAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GldasGranuleAdapter").finish_non_exhaustive()
    }
}

impl GldasGranuleAdapter {
    /// Wrap an archive implementation
    pub fn new(archive: Arc<dyn GranuleArchive>) -> Self {
        Self { archive }
    }

    /// Connect to Earthdata, logging in when only credentials are configured
    pub async fn connect(config: GldasConfig) -> Result<Self, ApplicationError> {
        let client = GldasClient::connect(config).await.map_err(Self::map_error)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Map integration error to application error
    fn map_error(err: GldasError) -> ApplicationError {
        match err {
            GldasError::ConnectionFailed(e)
            | GldasError::RequestFailed(e)
            | GldasError::ServiceUnavailable(e) => ApplicationError::ExternalService(e),
            GldasError::Unauthorized(e) => {
                ApplicationError::ExternalService(format!("Earthdata rejected credentials: {e}"))
            },
            GldasError::RateLimitExceeded => {
                ApplicationError::ExternalService("Earthdata rate limit exceeded".into())
            },
            GldasError::ParseError(e) => ApplicationError::Internal(e),
            err @ GldasError::NoAccessLink(_) => ApplicationError::ExternalService(err.to_string()),
            GldasError::InvalidCoordinates => {
                ApplicationError::InvalidRequest("Invalid coordinates".into())
            },
        }
    }
}

#[async_trait]
impl GranulePort for GldasGranuleAdapter {
    #[instrument(skip(self, query), fields(lat = query.location.latitude(), lon = query.location.longitude()))]
    async fn sample_year(
        &self,
        query: &HistoryQuery,
        year: i32,
    ) -> Result<Option<GridSample>, ApplicationError> {
        let (start, end) = query.window(year)?;

        let granules = self
            .archive
            .search(start, end)
            .await
            .map_err(Self::map_error)?;
        let Some(granule) = granules.first() else {
            debug!(%start, %end, "No granule in window");
            return Ok(None);
        };

        let names = WeatherVariable::ALL.map(archive_variable);
        let point = self
            .archive
            .read_point(
                granule,
                query.location.latitude(),
                query.location.longitude(),
                &names,
            )
            .await
            .map_err(Self::map_error)?;

        let grid = GeoLocation::new(point.latitude, point.longitude).map_err(|e| {
            ApplicationError::Internal(format!("Archive returned an invalid grid cell: {e}"))
        })?;

        debug!(granule = %granule.title, %grid, "Read grid cell");

        Ok(Some(WeatherVariable::ALL.into_iter().fold(
            GridSample::new(grid),
            |sample, variable| sample.with_raw(variable, point.value(archive_variable(variable))),
        )))
    }
}
