//! Datasheet integer compensation.
//!
//! The three stages must run in order: temperature produces `t_fine`, which
//! both pressure and humidity consume.  Shift counts, operand order and
//! intermediate widths follow the vendor reference exactly; changing any of
//! them moves the low bits of the result.  Arithmetic wraps instead of
//! trapping so that a corrupted register block yields a wrong number rather
//! than a panic.

use super::calibration::Calibration;

/// Upper clamp of the humidity accumulator (100 %RH in Q22.10).
const HUMIDITY_MAX_Q: i32 = 419_430_400;

/// Unpacked ADC values from the 8-byte measurement burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawReading {
    /// 20-bit pressure.
    pub pressure: i32,
    /// 20-bit temperature.
    pub temperature: i32,
    /// 16-bit humidity.
    pub humidity: i32,
}

impl RawReading {
    /// Unpack `press_msb press_lsb press_xlsb temp_msb temp_lsb temp_xlsb hum_msb hum_lsb`.
    pub fn from_burst(b: &[u8; 8]) -> Self {
        let be20 = |msb: u8, lsb: u8, xlsb: u8| {
            (i32::from(msb) << 12) | (i32::from(lsb) << 4) | (i32::from(xlsb) >> 4)
        };
        Self {
            pressure: be20(b[0], b[1], b[2]),
            temperature: be20(b[3], b[4], b[5]),
            humidity: (i32::from(b[6]) << 8) | i32::from(b[7]),
        }
    }
}

/// Fixed-point stage outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compensated {
    /// Shared intermediate from the temperature stage.
    pub t_fine: i32,
    /// Temperature in 0.01 °C.
    pub temperature_centi_c: i32,
    /// Pressure in Pa, Q24.8.
    pub pressure_q8_pa: u32,
    /// Relative humidity in %, Q22.10.
    pub humidity_q10_pct: u32,
}

/// Physical units handed to the sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Environment {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
}

impl From<Compensated> for Environment {
    fn from(c: Compensated) -> Self {
        Self {
            temperature_c: c.temperature_centi_c as f32 / 100.0,
            pressure_hpa: c.pressure_q8_pa as f32 / 256.0 / 100.0,
            humidity_pct: c.humidity_q10_pct as f32 / 1024.0,
        }
    }
}

/// Returns `(t_fine, temperature in 0.01 °C)`.
pub fn temperature(cal: &Calibration, adc_t: i32) -> (i32, i32) {
    let adc = i64::from(adc_t);
    let t1 = i64::from(cal.t1);

    let var1 = (((adc >> 3) - (t1 << 1)).wrapping_mul(i64::from(cal.t2))) >> 11;
    let x = (adc >> 4) - t1;
    let var2 = ((x.wrapping_mul(x) >> 12).wrapping_mul(i64::from(cal.t3))) >> 14;

    let t_fine = var1.wrapping_add(var2) as i32;
    let centi = t_fine.wrapping_mul(5).wrapping_add(128) >> 8;
    (t_fine, centi)
}

/// Pressure in Pa as Q24.8.  Returns 0 when the scale term is zero.
pub fn pressure(cal: &Calibration, adc_p: i32, t_fine: i32) -> u32 {
    let p1 = i64::from(cal.p1);
    let p2 = i64::from(cal.p2);
    let p3 = i64::from(cal.p3);
    let p4 = i64::from(cal.p4);
    let p5 = i64::from(cal.p5);
    let p6 = i64::from(cal.p6);
    let p7 = i64::from(cal.p7);
    let p8 = i64::from(cal.p8);
    let p9 = i64::from(cal.p9);

    let mut var1 = i64::from(t_fine) - 128_000;
    let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
    var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 17);
    var2 = var2.wrapping_add(p4 << 35);
    var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) >> 8)
        .wrapping_add(var1.wrapping_mul(p2) << 12);
    var1 = ((1i64 << 47).wrapping_add(var1).wrapping_mul(p1)) >> 33;
    if var1 == 0 {
        return 0;
    }

    let mut p = 1_048_576 - i64::from(adc_p);
    p = ((p << 31).wrapping_sub(var2))
        .wrapping_mul(3125)
        .wrapping_div(var1);
    var1 = p9.wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
    var2 = p8.wrapping_mul(p) >> 19;
    p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add(p7 << 4);
    p as u32
}

/// Relative humidity in % as Q22.10.
pub fn humidity(cal: &Calibration, adc_h: i32, t_fine: i32) -> u32 {
    let h1 = i32::from(cal.h1);
    let h2 = i32::from(cal.h2);
    let h3 = i32::from(cal.h3);
    let h4 = i32::from(cal.h4);
    let h5 = i32::from(cal.h5);
    let h6 = i32::from(cal.h6);

    let mut v = t_fine.wrapping_sub(76_800);

    let offset = (adc_h << 14)
        .wrapping_sub(h4 << 20)
        .wrapping_sub(h5.wrapping_mul(v))
        .wrapping_add(16_384)
        >> 15;
    let scale = ((v.wrapping_mul(h6) >> 10)
        .wrapping_mul((v.wrapping_mul(h3) >> 11).wrapping_add(32_768))
        >> 10)
        .wrapping_add(2_097_152)
        .wrapping_mul(h2)
        .wrapping_add(8192)
        >> 14;
    v = offset.wrapping_mul(scale);

    v = v.wrapping_sub((((v >> 15).wrapping_mul(v >> 15) >> 7).wrapping_mul(h1)) >> 4);
    v = v.clamp(0, HUMIDITY_MAX_Q);
    (v >> 12) as u32
}

/// Run all three stages in order.
pub fn compensate(cal: &Calibration, raw: RawReading) -> Compensated {
    let (t_fine, temperature_centi_c) = temperature(cal, raw.temperature);
    Compensated {
        t_fine,
        temperature_centi_c,
        pressure_q8_pa: pressure(cal, raw.pressure, t_fine),
        humidity_q10_pct: humidity(cal, raw.humidity, t_fine),
    }
}
