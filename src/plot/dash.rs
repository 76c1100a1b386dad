/// Split a polyline into the visible stretches of a dash pattern.
///
/// `pattern` alternates on/off lengths measured in the space `to_pixel`
/// projects into, starting with "on". Cut points are interpolated in data
/// space, which is exact as long as the projection is affine. An empty
/// pattern (or one with no positive length) returns the polyline whole.
pub fn dash_segments<F>(
    points: &[(f64, f64)],
    pattern: &[f64],
    to_pixel: F,
) -> Vec<Vec<(f64, f64)>>
where
    F: Fn((f64, f64)) -> (f64, f64),
{
    if points.is_empty() {
        return Vec::new();
    }
    if pattern.iter().all(|&len| len <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut segments = Vec::new();
    let mut current = vec![points[0]];
    let mut phase = 0;
    let mut remaining = pattern[0].max(0.0);

    for pair in points.windows(2) {
        let (p0, p1) = (pair[0], pair[1]);
        let (a, b) = (to_pixel(p0), to_pixel(p1));
        let length = (b.0 - a.0).hypot(b.1 - a.1);

        let mut travelled = 0.0;
        while length - travelled > remaining {
            travelled += remaining;
            let t = travelled / length;
            let cut = (p0.0 + (p1.0 - p0.0) * t, p0.1 + (p1.1 - p0.1) * t);

            if phase % 2 == 0 {
                current.push(cut);
                segments.push(std::mem::take(&mut current));
            } else {
                current = vec![cut];
            }
            phase = (phase + 1) % pattern.len();
            remaining = pattern[phase].max(0.0);
        }
        remaining -= length - travelled;

        if phase % 2 == 0 {
            current.push(p1);
        }
    }

    if phase % 2 == 0 && current.len() >= 2 {
        segments.push(current);
    }
    segments
}

/// Clip a polyline to the axis window.
///
/// Each segment is cut where it crosses the window edge, so a track that
/// leaves the plot still reaches the border. Returns one polyline per
/// stretch that stays inside.
pub fn clip_to_window(
    track: &[(f64, f64)],
    x: (f64, f64),
    y: (f64, f64),
) -> Vec<Vec<(f64, f64)>> {
    if let [only] = track {
        let inside = (x.0..=x.1).contains(&only.0) && (y.0..=y.1).contains(&only.1);
        return if inside { vec![vec![*only]] } else { Vec::new() };
    }

    let mut pieces = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    for pair in track.windows(2) {
        match clip_segment(pair[0], pair[1], x, y) {
            Some((start, end)) => {
                if current.last() != Some(&start) && !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
                if current.is_empty() {
                    current.push(start);
                }
                current.push(end);
            }
            None if !current.is_empty() => pieces.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Liang-Barsky clip of one segment. Endpoints that need no cut are returned
/// unchanged so consecutive segments still join exactly.
fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    x: (f64, f64),
    y: (f64, f64),
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-dx, p0.0 - x.0),
        (dx, x.1 - p0.0),
        (-dy, p0.1 - y.0),
        (dy, y.1 - p0.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| {
        if t == 0.0 {
            p0
        } else if t == 1.0 {
            p1
        } else {
            (p0.0 + dx * t, p0.1 + dy * t)
        }
    };
    Some((at(t0), at(t1)))
}
