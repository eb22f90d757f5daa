use log::debug;
use nims_types::{NimsError, NimsResult};

/// Наибольшее значение фактора и множителя частоты в заголовке
pub const MAX_RATE_TERM: i64 = i16::MAX as i64;

/// Допуск при проверке целочисленности частоты или периода
const INTEGRAL_TOLERANCE: f64 = 0.000001;

/// Точность рационального приближения
const APPROX_PRECISION: f64 = 1e-12;

/// Фактор и множитель частоты дискретизации для фиксированного заголовка.
///
/// Целая частота записывается как `(rate, 1)`, целый период как
/// `(-period, 1)`, остальные значения приближаются дробью `num/den`
/// и записываются как `(num, -den)`. Период длиннее 32767 с раскладывается
/// на два отрицательных множителя `(-a, -b)`, `a·b ≈ period`.
pub fn factor_multiplier(rate: f64) -> NimsResult<(i16, i16)> {
    if !rate.is_finite() || rate <= 0.0 || rate > MAX_RATE_TERM as f64 {
        return Err(NimsError::pack(format!(
            "Sample rate {rate} Hz cannot be expressed as factor/multiplier"
        )));
    }

    if (rate - rate.round()).abs() < INTEGRAL_TOLERANCE && rate >= 1.0 {
        return Ok((rate.round() as i16, 1));
    }

    if rate < 1.0 {
        let period = 1.0 / rate;

        if (period - period.round()).abs() < INTEGRAL_TOLERANCE
            && period.round() <= MAX_RATE_TERM as f64
        {
            return Ok((-(period.round() as i16), 1));
        }

        if period > MAX_RATE_TERM as f64 {
            return Ok(long_period(period));
        }
    }

    let (num, den) = rational_approx(rate, MAX_RATE_TERM, APPROX_PRECISION);

    if num == 0 {
        return Err(NimsError::pack(format!(
            "Sample rate {rate} Hz is too small for factor/multiplier"
        )));
    }

    Ok((num as i16, -(den as i16)))
}

/// Пара `(-a, -b)` для периода вне диапазона одного множителя.
///
/// Периоды длиннее 32767² с ограничиваются этим значением.
fn long_period(period: f64) -> (i16, i16) {
    let max = MAX_RATE_TERM as f64;

    if period > max * max {
        debug!(
            "Sample period {period} s exceeds factor/multiplier range, clamped to {} s",
            max * max
        );
        return (-(MAX_RATE_TERM as i16), -(MAX_RATE_TERM as i16));
    }

    let b = (period / max).ceil();
    let a = (period / b).round().min(max);

    if (a * b - period).abs() > INTEGRAL_TOLERANCE * period {
        debug!("Sample period {period} s approximated as {a} × {b} s");
    }

    (-(a as i16), -(b as i16))
}

/// Частота, которую задают фактор и множитель (обратная операция).
pub fn rate_from_factor_multiplier(
    factor: i16,
    multiplier: i16,
) -> f64 {
    let f = factor as f64;
    let m = multiplier as f64;

    match (factor > 0, multiplier > 0) {
        _ if factor == 0 || multiplier == 0 => 0.0,
        (true, true) => f * m,
        (true, false) => -f / m,
        (false, true) => -m / f,
        (false, false) => 1.0 / (f * m),
    }
}

/// Приближение цепной дробью: наилучшая подходящая дробь `num/den`
/// с числителем и знаменателем не больше `max`.
pub fn rational_approx(
    value: f64,
    max: i64,
    precision: f64,
) -> (i64, i64) {
    // Подходящие дроби h/k, начальные значения h(-2)=0, h(-1)=1, k(-2)=1, k(-1)=0
    let (mut h_prev, mut h) = (0i64, 1i64);
    let (mut k_prev, mut k) = (1i64, 0i64);
    let mut best = (value.round() as i64, 1i64);
    let mut x = value;

    loop {
        let a = (x + precision).floor() as i64;
        let h_next = a * h + h_prev;
        let k_next = a * k + k_prev;

        if h_next > max || k_next > max {
            break;
        }

        (h_prev, h) = (h, h_next);
        (k_prev, k) = (k, k_next);
        best = (h, k);

        let frac = x - a as f64;

        if (value - h as f64 / k as f64).abs() <= precision || frac.abs() <= precision {
            break;
        }

        x = 1.0 / frac;
    }

    best
}
