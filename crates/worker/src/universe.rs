use stockpick_core::catalog;
use stockpick_core::config::env_or;
use stockpick_core::domain::preferences::{InvestmentType, Sector};

#[derive(Debug, Clone)]
pub struct WarmOptions {
    /// Concurrent symbol fetches.
    pub concurrency: usize,
    /// Log progress after this many symbols.
    pub progress_every: usize,
}

impl Default for WarmOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            progress_every: 25,
        }
    }
}

impl WarmOptions {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            concurrency: env_or("WARM_CONCURRENCY", d.concurrency).max(1),
            progress_every: env_or("WARM_PROGRESS_EVERY", d.progress_every).max(1),
        }
    }
}

/// Comma-separated sector slugs; every sector when absent.
pub fn parse_sectors(arg: Option<&str>) -> anyhow::Result<Vec<Sector>> {
    let Some(arg) = arg else {
        return Ok(Sector::ALL.to_vec());
    };
    let mut out = Vec::new();
    for part in arg.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let sector = Sector::from_slug(part)
            .ok_or_else(|| anyhow::anyhow!("unknown sector {part:?}"))?;
        if !out.contains(&sector) {
            out.push(sector);
        }
    }
    anyhow::ensure!(!out.is_empty(), "--sectors must name at least one sector");
    Ok(out)
}

/// Comma-separated investment types; every type when absent.
pub fn parse_types(arg: Option<&str>) -> anyhow::Result<Vec<InvestmentType>> {
    let Some(arg) = arg else {
        return Ok(InvestmentType::CHOICES.iter().map(|(t, _)| *t).collect());
    };
    let mut out = Vec::new();
    for part in arg.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let ty = InvestmentType::parse(part)
            .ok_or_else(|| anyhow::anyhow!("unknown investment type {part:?}"))?;
        if !out.contains(&ty) {
            out.push(ty);
        }
    }
    anyhow::ensure!(!out.is_empty(), "--types must name at least one investment type");
    Ok(out)
}

pub fn build_universe(sectors: &[Sector], types: &[InvestmentType]) -> Vec<String> {
    catalog::universe(sectors, types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_whole_catalog() {
        assert_eq!(parse_sectors(None).unwrap().len(), 7);
        assert_eq!(parse_types(None).unwrap().len(), 4);
    }

    #[test]
    fn parses_and_dedups_lists() {
        assert_eq!(
            parse_sectors(Some("tech, energy,tech")).unwrap(),
            vec![Sector::Tech, Sector::Energy]
        );
        assert_eq!(
            parse_types(Some("etf,stocks")).unwrap(),
            vec![InvestmentType::Etf, InvestmentType::Stocks]
        );
        assert!(parse_sectors(Some("crypto")).is_err());
        assert!(parse_types(Some(" , ")).is_err());
    }

    #[test]
    fn universe_is_sorted_and_unique() {
        let symbols = build_universe(&[Sector::Tech], &[InvestmentType::Stocks]);
        assert!(symbols.contains(&"MSFT".to_string()));
        assert!(symbols.windows(2).all(|w| w[0] < w[1]));
    }
}
