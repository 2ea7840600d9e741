use domain::{DutyClass, SensorKind, SwitchState};
use smaas_protocol::{
    ClimateReading, ConfigRemoval, ProtocolError, RelayState, RfidEnvelope, SensorData, WireCodec,
};

#[test]
fn climate_reading_decodes_with_fields_intact() {
    let codec = WireCodec::default();
    let reading = SensorData::Climate(ClimateReading {
        sensor_id: 7,
        temperature: 21.5,
        humidity: 40.25,
        aqi: 12.0,
    });
    let bytes = codec.encode(&reading).expect("encode");
    let decoded: SensorData = codec.decode(&bytes).expect("decode");
    assert_eq!(decoded, reading);
    assert_eq!(decoded.kind(), SensorKind::Climate);
    assert_eq!(decoded.sensor_id(), 7);
}

#[test]
fn relay_state_carries_fixed_duty_code() {
    let codec = WireCodec::default();
    let bytes = codec
        .encode(&RelayState {
            duty: DutyClass::HeavyDuty,
            port: 2,
            state: SwitchState::On,
        })
        .expect("encode");
    // duty code, port, state variant index
    assert_eq!(bytes, vec![2, 2, 0]);
}

#[test]
fn relay_state_with_unknown_duty_is_rejected() {
    let codec = WireCodec::default();
    let result = codec.decode::<RelayState>(&[3, 1, 0]);
    assert!(matches!(result, Err(ProtocolError::Decode(_))));
}

#[test]
fn rfid_register_response_keeps_correlation_id() {
    let codec = WireCodec::default();
    let envelope = RfidEnvelope::RegisterResponse {
        id: "cred-1".to_string(),
        credential: vec![0xde, 0xad, 0xbe, 0xef],
    };
    let bytes = codec.encode(&envelope).expect("encode");
    match codec.decode::<RfidEnvelope>(&bytes).expect("decode") {
        RfidEnvelope::RegisterResponse { id, credential } => {
            assert_eq!(id, "cred-1");
            assert_eq!(credential, vec![0xde, 0xad, 0xbe, 0xef]);
        }
        other => panic!("unexpected envelope: {}", other.kind_name()),
    }
}

#[test]
fn removal_carries_only_sensor_id() {
    let removal = ConfigRemoval::new(SensorKind::Motion, 4);
    assert_eq!(removal, ConfigRemoval::Motion { sensor_id: 4 });
    assert_eq!(removal.kind(), SensorKind::Motion);
    assert_eq!(removal.sensor_id(), 4);
}
