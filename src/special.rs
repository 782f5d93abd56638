//! Special functions for hydrogen-like wavefunctions.
//!
//! Factorials, generalized Laguerre polynomials (radial part) and
//! associated Legendre polynomials (angular part), evaluated by the
//! standard three-term recurrences. Stable and finite over the quantum
//! number ranges the solver validates (n <= 7, l <= 6).

/// Factorial n! as f64.
///
/// Panics for negative input; callers must validate quantum numbers
/// before reaching these kernels.
#[inline]
pub fn factorial(n: i32) -> f64 {
    assert!(n >= 0, "factorial undefined for negative input: {n}");
    (1..=n as u64).map(|k| k as f64).product()
}

/// Double factorial n!! = n (n-2) (n-4) ... down to 1 or 2.
///
/// Defined for n >= -1 with the conventions (-1)!! = 1 and 0!! = 1;
/// panics below that range.
#[inline]
pub fn double_factorial(n: i32) -> f64 {
    assert!(n >= -1, "double factorial undefined below -1: {n}");
    let mut result = 1.0;
    let mut k = n;
    while k > 1 {
        result *= k as f64;
        k -= 2;
    }
    result
}

/// Generalized Laguerre polynomial L_k^alpha(x) by the three-term recurrence
///
///   L_i = ((2i - 1 + alpha - x) L_{i-1} - (i - 1 + alpha) L_{i-2}) / i
pub fn generalized_laguerre(k: u32, alpha: f64, x: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }

    let mut l_prev = 1.0;
    let mut l_curr = 1.0 + alpha - x;

    for i in 2..=k {
        let i_f = i as f64;
        let l_next = ((2.0 * i_f - 1.0 + alpha - x) * l_curr - (i_f - 1.0 + alpha) * l_prev) / i_f;
        l_prev = l_curr;
        l_curr = l_next;
    }

    l_curr
}

/// Legendre polynomial P_l(x).
fn legendre(l: u32, x: f64) -> f64 {
    match l {
        0 => 1.0,
        1 => x,
        _ => {
            let mut p_prev = 1.0;
            let mut p_curr = x;
            for i in 2..=l {
                let i_f = i as f64;
                let p_next = ((2.0 * i_f - 1.0) * x * p_curr - (i_f - 1.0) * p_prev) / i_f;
                p_prev = p_curr;
                p_curr = p_next;
            }
            p_curr
        }
    }
}

/// Associated Legendre polynomial P_l^m(x) with Condon-Shortley phase.
///
/// Seeds the recurrence at P_m^m = (-1)^m (1-x^2)^{m/2} (2m-1)!! and climbs
/// to P_l^m. Negative m uses the standard conversion
/// P_l^{-m} = (-1)^m (l-m)!/(l+m)! P_l^m.
pub fn associated_legendre(l: u32, m: i32, x: f64) -> f64 {
    let m_abs = m.unsigned_abs();
    if m_abs > l {
        return 0.0;
    }
    if m_abs == 0 {
        return legendre(l, x);
    }

    let m_f = m_abs as f64;
    let sign = if m_abs % 2 == 0 { 1.0 } else { -1.0 };
    let pmm = sign * (1.0 - x * x).powf(m_f / 2.0) * double_factorial(2 * m_abs as i32 - 1);

    let positive = if l == m_abs {
        pmm
    } else {
        let mut p_lower = pmm;
        let mut p_curr = x * (2.0 * m_f + 1.0) * pmm;
        for i in (m_abs + 2)..=l {
            let i_f = i as f64;
            let p_next = ((2.0 * i_f - 1.0) * x * p_curr - (i_f + m_f - 1.0) * p_lower) / (i_f - m_f);
            p_lower = p_curr;
            p_curr = p_next;
        }
        p_curr
    };

    if m < 0 {
        let conversion = sign * factorial((l - m_abs) as i32) / factorial((l + m_abs) as i32);
        conversion * positive
    } else {
        positive
    }
}
