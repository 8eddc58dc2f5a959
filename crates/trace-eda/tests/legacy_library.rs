use trace_eda::ElectricalKind;
use trace_eda::kicad::LegacySymbolLibrary;
use trace_test_utils::{LibrarySandbox, fixtures};

#[test]
fn test_timer_library_symbols() {
    let library =
        LegacySymbolLibrary::from_strings("Timer", fixtures::TIMER_LIB, Some(fixtures::TIMER_DCM))
            .unwrap();
    let ne555 = library.get_symbol("NE555D").unwrap();

    assert_eq!(ne555.library, "Timer");
    assert_eq!(ne555.reference, "U");
    assert_eq!(ne555.aliases, vec!["NE555P"]);
    assert_eq!(ne555.footprint_filters, vec!["SOIC*3.9x4.9mm*P1.27mm*"]);
    assert_eq!(
        ne555.doc.datasheet_url,
        "http://www.ti.com/lit/ds/symlink/ne555.pdf"
    );

    let pins: Vec<_> = ne555
        .pins
        .iter()
        .map(|p| format!("{}:{}:{}", p.number, p.name, p.electrical_kind.code()))
        .collect();
    insta::assert_snapshot!(pins.join(" "), @"1:GND:W 8:VCC:W 2:TR:I 3:Q:O 4:R:I 5:CV:I 6:THR:I 7:DIS:C");
    assert_eq!(ne555.shapes.len(), 1);
    assert_eq!(ne555.shapes[0].tag, "S");
}

#[test]
fn test_power_library_pins_are_power_inputs() {
    let library = LegacySymbolLibrary::from_strings("power", fixtures::POWER_LIB, None).unwrap();
    assert_eq!(library.symbol_names(), vec!["GND", "VCC"]);
    for symbol in library.symbols() {
        assert_eq!(symbol.reference, "#PWR");
        assert_eq!(symbol.pins.len(), 1);
        assert_eq!(symbol.pins[0].electrical_kind, ElectricalKind::PowerIn);
        assert_eq!(symbol.pins[0].style.as_deref(), Some("N"));
    }
}

#[test]
fn test_device_library_from_disk() {
    let sb = LibrarySandbox::with_kicad_fixtures();
    let library = LegacySymbolLibrary::from_file(&sb.library_dir().join("Device.lib")).unwrap();

    assert_eq!(library.symbol_names(), vec!["C", "LED", "Q_PNP_EBC", "R_US"]);
    let led = library.get_symbol("LED").unwrap();
    assert_eq!(led.description(), "Light emitting diode");
    assert_eq!(led.pins[0].name, "K");
    assert_eq!(led.pins[1].name, "A");
    assert_eq!(led.datasheet, None);
}
