use audio_status_menu::audio::Direction;
use audio_status_menu::status_bar::{LayoutType, SummaryContent};
use audio_status_menu::system::{AudioHardwareInterface, PreferencesInterface};

mod test_utils;
use test_utils::{DeviceSpecBuilder, output_device, start_service};

#[test]
fn test_no_featured_device_hides_summary_view() {
    let (service, _, _) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::SampleRate,
        None,
    );
    let status_bar = service.controller().status_bar();

    assert_eq!(status_bar.effective_layout(), LayoutType::None);
    assert!(status_bar.is_hidden());
    assert!(status_bar.shows_fallback_icon());
    assert!(status_bar.tooltip().is_none());
    assert!(service.controller().reported_length().is_none());
}

#[test]
fn test_selecting_featured_device_shows_preferred_layout() {
    let (mut service, _, preferences) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::SampleRate,
        None,
    );

    preferences.set_featured_device(Some(1));
    service.drain_pending();

    let status_bar = service.controller().status_bar();
    assert_eq!(status_bar.effective_layout(), LayoutType::SampleRate);
    assert!(!status_bar.is_hidden());
    assert!(!status_bar.shows_fallback_icon());
    assert_eq!(
        status_bar.tooltip(),
        Some("Interface is the device currently being displayed")
    );
    assert_eq!(
        status_bar.subview().map(|view| view.content()),
        Some(&SummaryContent::SampleRate {
            sample_rate: "48 kHz".to_string()
        })
    );
    // "48 kHz" is six glyphs, plus padding
    assert_eq!(service.controller().reported_length(), Some(52.0));
}

#[test]
fn test_liveness_round_trip() {
    let (mut service, hardware, _) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::SampleRate,
        Some(1),
    );
    assert_eq!(
        service.controller().status_bar().effective_layout(),
        LayoutType::SampleRate
    );

    hardware.set_alive(1, false);
    let update = service.controller_mut().update_status_bar();
    assert_eq!(update.layout, LayoutType::None);
    assert!(update.rebuilt);
    assert!(service.controller().status_bar().is_hidden());
    assert!(service.controller().status_bar().subview().is_none());

    hardware.set_alive(1, true);
    let update = service.controller_mut().update_status_bar();
    assert_eq!(update.layout, LayoutType::SampleRate);
    assert!(update.rebuilt);
    assert!(!service.controller().status_bar().is_hidden());
}

#[test]
fn test_same_state_refreshes_existing_view() {
    let (mut service, hardware, _) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::MasterVolumePercent,
        Some(1),
    );
    let view_id = service.controller().status_bar().subview().unwrap().id();

    hardware
        .set_virtual_master_volume(1, 0.75, Direction::Output)
        .unwrap();
    service.drain_pending();

    let update = service.controller_mut().update_status_bar();
    assert!(!update.rebuilt);

    let view = service.controller().status_bar().subview().unwrap();
    assert_eq!(view.id(), view_id);
    assert_eq!(view.represented_device(), Some(1));
    assert_eq!(
        view.content(),
        &SummaryContent::MasterVolumePercent {
            percent: "75%".to_string(),
            muted: false
        }
    );
}

#[test]
fn test_layout_change_builds_new_view() {
    let (mut service, _, preferences) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::SampleRate,
        Some(1),
    );
    let first = service.controller().status_bar().subview().unwrap().id();

    preferences.set_layout_type(LayoutType::MasterVolumeDecibels);
    service.drain_pending();

    let view = service.controller().status_bar().subview().unwrap();
    assert_ne!(view.id(), first);
    assert_eq!(view.layout(), LayoutType::MasterVolumeDecibels);
    assert_eq!(
        view.content(),
        &SummaryContent::MasterVolumeDecibels {
            decibels: "-6.0dBFS".to_string(),
            muted: false
        }
    );
}

#[test]
fn test_switching_to_none_discards_view_and_tooltip() {
    let (mut service, _, preferences) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::SampleRate,
        Some(1),
    );
    assert!(service.controller().status_bar().tooltip().is_some());

    preferences.set_layout_type(LayoutType::None);
    service.drain_pending();

    let status_bar = service.controller().status_bar();
    assert_eq!(status_bar.effective_layout(), LayoutType::None);
    assert!(status_bar.subview().is_none());
    assert!(status_bar.tooltip().is_none());
    assert!(status_bar.shows_fallback_icon());
}

#[test]
fn test_clock_source_layout_shows_active_source() {
    let device = DeviceSpecBuilder::new(2, "Converter")
        .output_channels(2)
        .sample_rate(96_000.0)
        .sample_rates(&[48_000.0, 96_000.0])
        .clock_sources(&[(1, "Internal"), (2, "Word Clock")])
        .clock_source(2)
        .build();
    let (mut service, hardware, _) = start_service(
        vec![device],
        LayoutType::SampleRateAndClockSource,
        Some(2),
    );

    assert_eq!(
        service.controller().status_bar().subview().map(|view| view.content()),
        Some(&SummaryContent::SampleRateAndClockSource {
            sample_rate: "96 kHz".to_string(),
            clock_source: "Word Clock".to_string(),
        })
    );

    hardware.set_clock_source_id(2, 1, Direction::Output).unwrap();
    service.drain_pending();

    assert_eq!(
        service.controller().status_bar().subview().map(|view| view.content()),
        Some(&SummaryContent::SampleRateAndClockSource {
            sample_rate: "96 kHz".to_string(),
            clock_source: "Internal".to_string(),
        })
    );
}

#[test]
fn test_resize_listener_sees_each_new_length_once() {
    use std::sync::{Arc, Mutex};

    let (mut service, hardware, _) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::SampleRate,
        Some(1),
    );
    let lengths = Arc::new(Mutex::new(Vec::new()));
    let recorded = lengths.clone();
    service
        .controller_mut()
        .on_resize(Box::new(move |length| recorded.lock().unwrap().push(length)));

    // Same rate twice, then a rate with a longer label
    service.controller_mut().update_status_bar();
    hardware.set_nominal_sample_rate(1, 44_100.0).unwrap();
    service.drain_pending();

    assert_eq!(*lengths.lock().unwrap(), vec![66.0]);
}

#[test]
fn test_padding_change_relayouts_visible_view() {
    let (mut service, _, _) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::MasterVolumeGraphic,
        Some(1),
    );
    assert_eq!(service.controller().status_bar().length(), 36.0);

    service.controller_mut().set_padding(4.0);
    assert_eq!(service.controller().reported_length(), Some(30.0));
}

#[test]
fn test_width_reported_again_after_view_hides() {
    use std::sync::{Arc, Mutex};

    let (mut service, _, preferences) = start_service(
        vec![output_device(1, "Interface")],
        LayoutType::SampleRate,
        None,
    );
    let lengths = Arc::new(Mutex::new(Vec::new()));
    let recorded = lengths.clone();
    service
        .controller_mut()
        .on_resize(Box::new(move |length| recorded.lock().unwrap().push(length)));

    preferences.set_featured_device(Some(1));
    service.drain_pending();
    preferences.set_featured_device(None);
    service.drain_pending();

    assert!(service.controller().status_bar().is_hidden());
    assert!(service.controller().reported_length().is_none());

    preferences.set_featured_device(Some(1));
    service.drain_pending();

    assert_eq!(*lengths.lock().unwrap(), vec![52.0, 52.0]);
}
