pub fn is_numeric_min(min: u64) -> impl Fn(String) -> Result<(), String> {
    move |v: String| {
        let val = v.parse::<u64>().map_err(|_| "must be numeric".to_owned())?;

        if val < min {
            return Err(format!("must be >= {}", min));
        }

        Ok(())
    }
}

/// Mapbox accepts zoom levels 0 through 22.
pub fn is_zoom(v: String) -> Result<(), String> {
    let val = v.parse::<u8>().map_err(|_| "must be numeric".to_owned())?;

    if val > 22 {
        return Err("must be <= 22".to_owned());
    }

    Ok(())
}

/// Mapbox static images are at most 1280 pixels wide or high.
pub fn is_image_size(v: String) -> Result<(), String> {
    let val = v.parse::<u32>().map_err(|_| "must be numeric".to_owned())?;

    if val < 1 || val > 1280 {
        return Err("must be between 1 and 1280".to_owned());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_min() {
        assert!(is_numeric_min(1)("1".to_owned()).is_ok());
        assert!(is_numeric_min(1)("0".to_owned()).is_err());
        assert!(is_numeric_min(0)("ten".to_owned()).is_err());
    }

    #[test]
    fn zoom_range() {
        assert!(is_zoom("18".to_owned()).is_ok());
        assert!(is_zoom("23".to_owned()).is_err());
    }

    #[test]
    fn image_size_range() {
        assert!(is_image_size("600".to_owned()).is_ok());
        assert!(is_image_size("0".to_owned()).is_err());
        assert!(is_image_size("1281".to_owned()).is_err());
    }
}
