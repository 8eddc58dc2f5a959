//! Small KiCad legacy libraries and footprints used across tests.
//!
//! The parts mirror their stock KiCad counterparts closely enough for the
//! parser, catalog and checker, but carry only the records those need.

pub const DEVICE_LIB: &str = r#"EESchema-LIBRARY Version 2.4
#encoding utf-8
#
# C
#
DEF C C 0 10 N Y 1 F N
F0 "C" 25 100 50 H V L CNN
F1 "C" 25 -100 50 H V L CNN
F2 "" 38 -150 50 H I C CNN
F3 "" 0 0 50 H I C CNN
$FPLIST
 C_*
$ENDFPLIST
DRAW
P 2 0 1 20 -80 -30 80 -30 N
P 2 0 1 20 -80 30 80 30 N
X ~ 1 0 150 110 D 50 50 1 1 P
X ~ 2 0 -150 110 U 50 50 1 1 P
ENDDRAW
ENDDEF
#
# LED
#
DEF LED D 0 40 N N 1 F N
F0 "D" 0 100 50 H V C CNN
F1 "LED" 0 -100 50 H V C CNN
F2 "" 0 0 50 H I C CNN
F3 "~" 0 0 50 H I C CNN
$FPLIST
 LED*
$ENDFPLIST
DRAW
P 2 0 1 8 -50 -50 -50 50 N
P 4 0 1 8 50 -50 -50 0 50 50 50 -50 N
X K 1 -150 0 100 R 50 50 1 1 P
X A 2 150 0 100 L 50 50 1 1 P
ENDDRAW
ENDDEF
#
# Q_PNP_EBC
#
DEF Q_PNP_EBC Q 0 0 Y N 1 F N
F0 "Q" 200 50 50 H V L CNN
F1 "Q_PNP_EBC" 200 -50 50 H V L CNN
F2 "" 200 100 50 H I C CNN
F3 "~" 0 0 50 H I C CNN
$FPLIST
 TO?92*
$ENDFPLIST
DRAW
C 50 0 111 0 1 10 N
X E 1 100 -200 100 U 50 50 1 1 P
X B 2 -200 0 225 R 50 50 1 1 I
X C 3 100 200 100 D 50 50 1 1 P
ENDDRAW
ENDDEF
#
# R_US
#
DEF R_US R 0 0 N Y 1 F N
F0 "R" 80 0 50 V V C CNN
F1 "R_US" -80 0 50 V V C CNN
F2 "" 30 -10 50 V I C CNN
F3 "~" 0 0 50 H I C CNN
$FPLIST
 R_*
$ENDFPLIST
DRAW
P 2 0 1 0 0 -90 0 -100 N
P 2 0 1 0 0 90 0 100 N
X ~ 1 0 150 50 D 50 50 1 1 P
X ~ 2 0 -150 50 U 50 50 1 1 P
ENDDRAW
ENDDEF
#
#End Library
"#;

pub const DEVICE_DCM: &str = r#"EESchema-DOCLIB  Version 2.0
#
$CMP C
D Unpolarized capacitor
K cap capacitor
F ~
$ENDCMP
#
$CMP LED
D Light emitting diode
K LED diode
F ~
$ENDCMP
#
$CMP Q_PNP_EBC
D PNP transistor, emitter/base/collector
K transistor PNP
F ~
$ENDCMP
#
$CMP R_US
D Resistor, US symbol
K R res resistor
F ~
$ENDCMP
#
#End Doc Library
"#;

pub const TIMER_LIB: &str = r#"EESchema-LIBRARY Version 2.4
#encoding utf-8
#
# NE555D
#
DEF NE555D U 0 20 Y Y 1 F N
F0 "U" -400 350 50 H V L CNN
F1 "NE555D" 100 350 50 H V L CNN
F2 "Package_SO:SOIC-8_3.9x4.9mm_P1.27mm" 850 -400 50 H I C CNN
F3 "" 0 0 50 H I C CNN
ALIAS NE555P
$FPLIST
 SOIC*3.9x4.9mm*P1.27mm*
$ENDFPLIST
DRAW
S -350 -300 350 300 0 1 10 f
X GND 1 0 -400 100 U 50 50 0 0 W
X VCC 8 0 400 100 D 50 50 0 0 W
X TR 2 -500 200 150 R 50 50 1 1 I
X Q 3 500 200 150 L 50 50 1 1 O
X R 4 -500 -200 150 R 50 50 1 1 I I
X CV 5 -500 0 150 R 50 50 1 1 I
X THR 6 500 -200 150 L 50 50 1 1 I
X DIS 7 500 0 150 L 50 50 1 1 C
ENDDRAW
ENDDEF
#
#End Library
"#;

pub const TIMER_DCM: &str = r#"EESchema-DOCLIB  Version 2.0
#
$CMP NE555D
D Precision Timers, 555 compatible, SOIC-8
K single timer 555
F http://www.ti.com/lit/ds/symlink/ne555.pdf
$ENDCMP
#
#End Doc Library
"#;

pub const POWER_LIB: &str = r##"EESchema-LIBRARY Version 2.4
#encoding utf-8
#
# GND
#
DEF GND #PWR 0 0 Y Y 1 F P
F0 "#PWR" 0 -250 50 H I C CNN
F1 "GND" 0 -150 50 H V C CNN
F2 "" 0 0 50 H I C CNN
F3 "" 0 0 50 H I C CNN
DRAW
P 6 0 1 0 0 0 0 -50 50 -50 0 -100 -50 -50 0 -50 N
X GND 1 0 0 0 D 50 50 1 1 W N
ENDDRAW
ENDDEF
#
# VCC
#
DEF VCC #PWR 0 0 Y Y 1 F P
F0 "#PWR" 0 -150 50 H I C CNN
F1 "VCC" 0 150 50 H V C CNN
F2 "" 0 0 50 H I C CNN
F3 "" 0 0 50 H I C CNN
DRAW
C 0 75 25 0 1 0 N
P 2 0 1 0 0 0 0 50 N
X VCC 1 0 0 0 U 50 50 1 1 W N
ENDDRAW
ENDDEF
#
#End Library
"##;

/// A library whose second definition has a pin name with two digit runs.
pub const MALFORMED_LIB: &str = r#"EESchema-LIBRARY Version 2.4
#
DEF GOOD U 0 40 Y Y 1 F N
F0 "U" 0 0 50 H V C CNN
X IN 1 0 0 100 R 50 50 1 1 I
ENDDEF
#
DEF BAD U 0 40 Y Y 1 F N
F0 "U" 0 0 50 H V C CNN
X A1B2 1 0 0 100 R 50 50 1 1 I
ENDDEF
#
#End Library
"#;

/// Footprints as `(directory, name, pad count)`.
pub const FOOTPRINTS: &[(&str, &str, usize)] = &[
    ("Capacitor_THT.pretty", "C_Disc_D3.0mm_W1.6mm_P2.50mm", 2),
    ("LED_THT.pretty", "LED_D5.0mm", 2),
    ("Package_SO.pretty", "SOIC-16_3.9x9.9mm_P1.27mm", 16),
    ("Package_SO.pretty", "SOIC-8_3.9x4.9mm_P1.27mm", 8),
    ("Package_SO.pretty", "TSSOP-8_3x3mm_P0.65mm", 8),
    ("Package_TO_SOT_THT.pretty", "TO-92_Inline", 3),
    ("Resistor_THT.pretty", "R_Axial_DIN0207_L6.3mm_D2.5mm_P10.16mm_Horizontal", 2),
];

/// Minimal `.kicad_mod` text with `pads` numbered pads.
pub fn kicad_mod(name: &str, pads: usize) -> String {
    let mut out = format!("(module {name} (layer F.Cu) (tedit 5A02FF57)\n  (fp_text reference REF** (at 0 -2) (layer F.SilkS))\n");
    for i in 1..=pads {
        let y = (i as f64 - 1.0) * 1.27;
        out.push_str(&format!(
            "  (pad {i} smd rect (at 0 {y}) (size 1.5 0.6) (layers F.Cu F.Paste F.Mask))\n"
        ));
    }
    out.push_str(")\n");
    out
}
