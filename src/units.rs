//! Stateless conversions between the unit systems the competition rules and
//! component datasheets are written in.

const FEET_PER_METER: f64 = 3.280_84;
const METERS_PER_MILE: f64 = 1609.344;
const MPS_PER_KNOT: f64 = 0.514_444;
const MPS_PER_MPH: f64 = 0.447_04;
const WATTS_PER_HP: f64 = 745.699_872;
const MBAR_PER_INHG: f64 = 33.863_886;
const NEWTONS_PER_LBF: f64 = 4.448_221_615;
const KG_PER_LB: f64 = 0.453_592_37;
const MBAR_PER_LBF_FT2: f64 = 0.478_802_6;
const KG_M3_PER_SLUG_FT3: f64 = 515.378_818;
const GRAVITY: f64 = 9.806_65;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - 273.15
}

pub fn celsius_to_rankine(celsius: f64) -> f64 {
    (celsius + 273.15) * 9.0 / 5.0
}

pub fn rankine_to_celsius(rankine: f64) -> f64 {
    rankine * 5.0 / 9.0 - 273.15
}

pub fn feet_to_meters(feet: f64) -> f64 {
    feet / FEET_PER_METER
}

pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

pub fn inches_to_meters(inches: f64) -> f64 {
    feet_to_meters(inches / 12.0)
}

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

pub fn square_feet_to_square_meters(feet_squared: f64) -> f64 {
    feet_squared / (FEET_PER_METER * FEET_PER_METER)
}

pub fn square_meters_to_square_feet(meters_squared: f64) -> f64 {
    meters_squared * FEET_PER_METER * FEET_PER_METER
}

pub fn knots_to_mps(knots: f64) -> f64 {
    knots * MPS_PER_KNOT
}

pub fn mps_to_knots(mps: f64) -> f64 {
    mps / MPS_PER_KNOT
}

/// Feet per minute to metres per second.
pub fn fpm_to_mps(fpm: f64) -> f64 {
    feet_to_meters(fpm) / 60.0
}

pub fn mps_to_fpm(mps: f64) -> f64 {
    meters_to_feet(mps) * 60.0
}

pub fn mph_to_mps(mph: f64) -> f64 {
    mph * MPS_PER_MPH
}

pub fn mps_to_mph(mps: f64) -> f64 {
    mps / MPS_PER_MPH
}

pub fn hp_to_watts(hp: f64) -> f64 {
    hp * WATTS_PER_HP
}

pub fn watts_to_hp(watts: f64) -> f64 {
    watts / WATTS_PER_HP
}

pub fn inhg_to_mbar(inhg: f64) -> f64 {
    inhg * MBAR_PER_INHG
}

pub fn mbar_to_inhg(mbar: f64) -> f64 {
    mbar / MBAR_PER_INHG
}

pub fn mbar_to_pascals(mbar: f64) -> f64 {
    mbar * 100.0
}

pub fn pascals_to_mbar(pascals: f64) -> f64 {
    pascals / 100.0
}

pub fn kg_to_lbs(kg: f64) -> f64 {
    kg / KG_PER_LB
}

pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs * KG_PER_LB
}

pub fn lbf_to_newtons(lbf: f64) -> f64 {
    lbf * NEWTONS_PER_LBF
}

pub fn newtons_to_lbf(newtons: f64) -> f64 {
    newtons / NEWTONS_PER_LBF
}

/// Pounds-force per square foot to millibars.
pub fn lbf_per_square_foot_to_mbar(lbf_ft2: f64) -> f64 {
    lbf_ft2 * MBAR_PER_LBF_FT2
}

pub fn mbar_to_lbf_per_square_foot(mbar: f64) -> f64 {
    mbar / MBAR_PER_LBF_FT2
}

/// Weight in newtons to mass in kilograms under standard gravity.
pub fn newtons_to_kg(newtons: f64) -> f64 {
    newtons / GRAVITY
}

pub fn kg_to_newtons(kg: f64) -> f64 {
    kg * GRAVITY
}

pub fn slugs_per_cubic_foot_to_kg_per_cubic_meter(slug_ft3: f64) -> f64 {
    slug_ft3 * KG_M3_PER_SLUG_FT3
}

pub fn kg_per_cubic_meter_to_slugs_per_cubic_foot(kg_m3: f64) -> f64 {
    kg_m3 / KG_M3_PER_SLUG_FT3
}

/// Power loading in W/N to hp/kg.
pub fn watts_per_newton_to_hp_per_kg(watts_per_newton: f64) -> f64 {
    watts_to_hp(watts_per_newton) * GRAVITY
}

pub fn watt_hours_to_joules(wh: f64) -> f64 {
    wh * 3600.0
}

pub fn joules_to_watt_hours(joules: f64) -> f64 {
    joules / 3600.0
}
