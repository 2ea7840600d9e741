//! 遥测入库：每条上行读数追加一行记录。

use crate::context::GatewayContext;
use crate::error::GatewayError;
use crate::router::ChannelHandler;
use async_trait::async_trait;
use domain::InboundMessage;
use smaas_protocol::{Channel, SensorData};
use smaas_storage::{Measurement, TelemetryRecord, TelemetryStore, new_record_id};
use smaas_telemetry::record_reading_written;
use std::sync::Arc;
use tracing::info;

pub struct TelemetryIngestor {
    ctx: Arc<GatewayContext>,
}

impl TelemetryIngestor {
    pub fn new(ctx: Arc<GatewayContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ChannelHandler for TelemetryIngestor {
    async fn handle(
        &self,
        device_id: &str,
        channel: Channel,
        message: &InboundMessage,
    ) -> Result<(), GatewayError> {
        let data: SensorData = self.ctx.codec.decode(&message.payload)?;
        if let Some(expected) = channel.sensor_kind()
            && expected != data.kind()
        {
            return Err(GatewayError::KindMismatch {
                expected,
                actual: data.kind(),
            });
        }
        let record = TelemetryRecord {
            reading_id: new_record_id(),
            device_id: device_id.to_string(),
            sensor_id: data.sensor_id(),
            recorded_at_ms: message.received_at_ms,
            measurement: measurement_of(&data),
        };
        self.ctx.store.append_reading(record).await?;
        record_reading_written();
        info!(
            target: "smaas.gateway",
            device_id = %device_id,
            sensor_id = data.sensor_id(),
            kind = %data.kind(),
            "telemetry_saved"
        );
        Ok(())
    }
}

fn measurement_of(data: &SensorData) -> Measurement {
    match data {
        SensorData::Climate(reading) => Measurement::Climate {
            temperature: f64::from(reading.temperature),
            humidity: f64::from(reading.humidity),
            air_quality: f64::from(reading.aqi),
        },
        SensorData::Light(reading) => Measurement::LightLevel {
            value: f64::from(reading.level),
        },
        SensorData::Motion(reading) => Measurement::Motion {
            detected: reading.detected,
        },
    }
}
