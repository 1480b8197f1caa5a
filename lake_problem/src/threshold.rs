use tracing::debug;

use crate::LakeError;

/// Search interval for the critical phosphorus stock.
pub const PCRIT_BRACKET: (f64, f64) = (0.01, 1.5);

const XTOL: f64 = 2e-12;
const RTOL: f64 = 4.0 * f64::EPSILON;
const MAX_ITER: usize = 100;

/// Critical stock `Pcrit` for decay `b` and recycling exponent `q`.
///
/// Solves `x^q / (1 + x^q) = b * x` on [`PCRIT_BRACKET`]. Above this level
/// recycling outpaces decay and the lake cannot recover on its own.
pub fn critical_threshold(b: f64, q: f64) -> Result<f64, LakeError> {
    let (lower, upper) = PCRIT_BRACKET;
    let pcrit = brentq(
        |x| {
            let xq = x.powf(q);
            xq / (1.0 + xq) - b * x
        },
        lower,
        upper,
    )?;
    debug!(b, q, pcrit, "critical threshold solved");
    Ok(pcrit)
}

/// Brent's method on a sign-changing bracket `[xa, xb]`.
///
/// Inverse quadratic / secant steps where they shrink the bracket fast
/// enough, bisection otherwise.
fn brentq<F>(f: F, xa: f64, xb: f64) -> Result<f64, LakeError>
where
    F: Fn(f64) -> f64,
{
    let mut xpre = xa;
    let mut xcur = xb;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);

    if !fpre.is_finite() || !fcur.is_finite() {
        return Err(LakeError::NonFinite("critical threshold bracket"));
    }
    if fpre * fcur > 0.0 {
        return Err(LakeError::RootNotBracketed {
            lower: xa,
            upper: xb,
            f_lower: fpre,
            f_upper: fcur,
        });
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for _ in 0..MAX_ITER {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let tol = (XTOL + RTOL * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < tol {
            return Ok(xcur);
        }

        if spre.abs() > tol && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - tol) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > tol {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { tol } else { -tol };
        }
        fcur = f(xcur);
        if !fcur.is_finite() {
            return Err(LakeError::NonFinite("critical threshold iterate"));
        }
    }

    Err(LakeError::RootNotConverged {
        iterations: MAX_ITER,
    })
}
