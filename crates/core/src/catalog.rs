//! Static sector universe: which symbols are considered for each sector and
//! investment type.

use crate::domain::preferences::{InvestmentPreferences, InvestmentType, Sector};
use std::collections::BTreeSet;

pub fn sector_stocks(sector: Sector) -> &'static [&'static str] {
    match sector {
        Sector::Tech => &[
            "AAPL", "MSFT", "GOOGL", "META", "NVDA", "AMD", "INTC", "CSCO", "ADBE", "CRM", "TSM",
            "AVGO", "ORCL", "ACN", "ASML", "TXN", "QCOM", "IBM", "NOW", "INTU", "ADI", "MU",
            "AMAT", "LRCX", "SNPS", "CDNS", "KLAC", "PANW", "WDAY", "TEAM",
        ],
        Sector::Healthcare => &[
            "JNJ", "UNH", "PFE", "ABT", "TMO", "MRK", "DHR", "ABBV", "BMY", "AMGN", "LLY", "CVS",
            "ISRG", "GILD", "REGN", "VRTX", "MRNA", "BIIB", "ILMN", "IDXX", "BSX", "ZBH", "BAX",
            "EW", "SGEN", "HUM", "CI", "BDX", "IQV", "ZTS",
        ],
        Sector::Finance => &[
            "JPM", "BAC", "WFC", "C", "GS", "MS", "BLK", "AXP", "SPGI", "CME", "SCHW", "USB",
            "PNC", "TFC", "AIG", "MMC", "AON", "MET", "PRU", "ALL", "CB", "PGR", "TRV", "AJG",
            "FITB", "SIVB", "TROW", "DFS", "NTRS", "STT",
        ],
        Sector::Energy => &[
            "XOM", "CVX", "COP", "SLB", "EOG", "PXD", "PSX", "VLO", "KMI", "WMB", "MPC", "OXY",
            "DVN", "HAL", "BKR", "HES", "FANG", "CVI", "CTRA", "MRO", "OKE", "EPD", "ET", "TRGP",
            "LNG", "MPLX", "CEQP", "DCP",
        ],
        Sector::Consumer => &[
            "PG", "KO", "PEP", "WMT", "COST", "NKE", "MCD", "DIS", "SBUX", "HD", "TGT", "LOW",
            "EL", "CL", "KMB", "GIS", "K", "HSY", "KHC", "STZ", "MDLZ", "KR", "SYY", "TSN", "CAG",
            "HRL", "MKC", "CPB", "SJM", "TAP",
        ],
        Sector::RealEstate => &[
            "AMT", "PLD", "CCI", "EQIX", "PSA", "DLR", "O", "WELL", "AVB", "EQR", "SPG", "VICI",
            "INVH", "MAA", "UDR", "ARE", "BXP", "VTR", "HST", "KIM", "REG", "FRT", "CPT", "EXR",
            "PEAK", "HIW", "DEI", "SLG", "ACC", "AIV",
        ],
        Sector::Utilities => &[
            "NEE", "DUK", "SO", "D", "AEP", "EXC", "SRE", "XEL", "WEC", "ES", "ED", "EIX", "PEG",
            "ETR", "FE", "AEE", "CMS", "CNP", "DTE", "PPL", "AES", "AWK", "LNT", "EVRG", "NI",
            "PNW", "NRG", "IDA", "ATO", "OGE",
        ],
    }
}

pub fn sector_etfs(sector: Sector) -> &'static [&'static str] {
    match sector {
        Sector::Tech => &[
            "XLK", "VGT", "IYW", "FTEC", "RYT", "QTEC", "IGV", "SOXX", "SMH", "ARKK", "ARKW",
            "QQQM", "WCLD", "AIQ", "BOTZ",
        ],
        Sector::Healthcare => &[
            "XLV", "VHT", "IYH", "FHLC", "RYH", "IBB", "XBI", "ARKG", "IHI", "GNOM",
        ],
        Sector::Finance => &[
            "XLF", "VFH", "IYF", "FNCL", "RYF", "KBE", "KRE", "IAI", "IYG", "KBWB", "FTXO",
            "QABA", "DPST", "FINU", "FINZ",
        ],
        Sector::Energy => &[
            "XLE", "VDE", "IYE", "FENY", "RYE", "PXE", "IEO", "PXJ", "FILL", "ICLN", "TAN", "FAN",
            "QCLN", "PBW", "ERTH",
        ],
        Sector::Consumer => &[
            "XLP", "VDC", "IYK", "FSTA", "RHS", "XLY", "VCR", "IYC", "FDIS", "RCD", "PEZ", "IEDI",
            "WANT", "PSL", "FXG",
        ],
        Sector::RealEstate => &[
            "XLRE", "VNQ", "IYR", "FREL", "RWR", "SCHH", "ICF", "USRT", "REZ", "BBRE", "RWX",
            "MORT", "SRET", "ROOF", "NETL",
        ],
        Sector::Utilities => &[
            "XLU", "VPU", "IDU", "FUTY", "RYU", "PUI", "URA", "FXU", "PSCU", "UTES", "JHMU",
            "UTSL", "NLR", "KBUY",
        ],
    }
}

pub fn sector_mutual_funds(sector: Sector) -> &'static [&'static str] {
    match sector {
        Sector::Tech => &[
            "FTECX", "FSPTX", "ROGSX", "PRGTX", "JAGTX", "DTECX", "PGTAX", "FSCSX", "PRMTX",
            "VITAX",
        ],
        Sector::Healthcare => &[
            "VGHCX", "FSMEX", "THIYX", "JAGLX", "PHSTX", "FBIOX", "FSHCX", "PRHSX", "ETHSX",
            "VRHCX",
        ],
        Sector::Finance => &[
            "FSVLX", "FSFXX", "PRISX", "JNFSX", "PFSAX", "VFAIX", "RYFIX", "FSRBX", "FIDSX",
            "KBWIX",
        ],
        Sector::Energy => &[
            "VGENX", "FSENX", "FANAX", "PRNEX", "MLPFX", "ICBAX", "AMLPX", "EMLPX", "OIGLX",
            "ENPIX",
        ],
        Sector::Consumer => &[
            "FSCPX", "FCNSX", "VCDAX", "VCSAX", "PRNHX", "PGCOX", "RYRTX", "FSRPX", "FSUTX",
            "FDFAX",
        ],
        Sector::RealEstate => &[
            "FRESX", "TRREX", "CSRSX", "VGSLX", "DFREX", "JAREX", "FRIFX", "PRERX", "MRESX",
            "CGMRX",
        ],
        Sector::Utilities => &[
            "FSUTX", "PRUAX", "GAUIX", "VUIAX", "EVTMX", "FKUTX", "MLUTX", "GUTIX", "UTIIX",
            "FIUIX",
        ],
    }
}

pub fn sector_bonds(sector: Sector) -> &'static [&'static str] {
    match sector {
        Sector::Tech => &["VCIT", "LQD", "IGLB", "USIG", "VCSH", "SPBO", "IGIB", "SPSB"],
        Sector::Healthcare => &["VGIT", "IEF", "SCHR", "VGLT", "TLH", "SPTL"],
        Sector::Finance => &[
            "AGG", "BND", "VCIT", "LQD", "VCSH", "HYG", "JNK", "MBB", "TLT", "SHY",
        ],
        Sector::Energy => &[
            "EMLC", "EMB", "PCY", "VWOB", "IGEM", "EMHY", "LEMB", "EBND", "ELD", "EMLP",
        ],
        Sector::Consumer => &[
            "MUB", "TFI", "ITM", "SUB", "PZA", "SHM", "VTEB", "MLN", "MMIN", "BCHG",
        ],
        Sector::RealEstate => &[
            "CMBS", "REM", "MORT", "VMBS", "GNMA", "SRET", "ROOF", "NETL", "VNQ", "IYR",
        ],
        Sector::Utilities => &[
            "BAB", "BABS", "GBAB", "BTT", "BKN", "BTA", "BFK", "BLE", "MUC", "MUH",
        ],
    }
}

/// Symbols the provider is known to file under a non-tech sector.
pub fn sector_override(symbol: &str) -> Option<Sector> {
    const TECH: &[&str] = &[
        "GOOGL", "GOOG", "META", "AMZN", "NFLX", "AAPL", "MSFT", "NVDA", "AMD", "INTC", "CSCO",
        "ADBE", "CRM", "TSLA",
    ];
    let symbol = symbol.trim().to_ascii_uppercase();
    TECH.contains(&symbol.as_str()).then_some(Sector::Tech)
}

/// Maps a provider sector label (or a slug) onto a catalog slug. Unknown
/// labels come back lowercased.
pub fn standardize_sector(sector: &str) -> String {
    let lower = sector.trim().to_ascii_lowercase();
    let mapped = match lower.as_str() {
        "technology"
        | "information technology"
        | "it services"
        | "semiconductors"
        | "software"
        | "communication services"
        | "internet content & information"
        | "electronic components"
        | "semiconductor equipment & materials"
        | "computer hardware" => Some(Sector::Tech),
        "health care" | "healthcare" => Some(Sector::Healthcare),
        "financial" | "financials" | "financial services" => Some(Sector::Finance),
        "energy" => Some(Sector::Energy),
        "consumer goods" | "consumer defensive" | "consumer cyclical" | "consumer staples"
        | "consumer discretionary" => Some(Sector::Consumer),
        "real estate" | "real_estate" => Some(Sector::RealEstate),
        "utilities" => Some(Sector::Utilities),
        _ => None,
    };
    match mapped {
        Some(s) => s.slug().to_string(),
        None => lower,
    }
}

/// De-duplicated candidate symbols for a preference set, in sorted order.
pub fn candidate_symbols(prefs: &InvestmentPreferences) -> Vec<String> {
    let mut out = BTreeSet::new();
    for &sector in &prefs.sectors {
        out.extend(sector_stocks(sector).iter().copied());
        if prefs.wants(InvestmentType::Etf) {
            out.extend(sector_etfs(sector).iter().copied());
        }
        if prefs.wants(InvestmentType::MutualFunds) {
            out.extend(sector_mutual_funds(sector).iter().copied());
        }
        if prefs.wants(InvestmentType::Bonds) {
            out.extend(sector_bonds(sector).iter().copied());
        }
    }
    out.into_iter().map(str::to_string).collect()
}

/// Every symbol in the catalog for the given sectors and investment types.
pub fn universe(sectors: &[Sector], types: &[InvestmentType]) -> Vec<String> {
    let mut out = BTreeSet::new();
    for &sector in sectors {
        for ty in types {
            let symbols = match ty {
                InvestmentType::Stocks => sector_stocks(sector),
                InvestmentType::Etf => sector_etfs(sector),
                InvestmentType::MutualFunds => sector_mutual_funds(sector),
                InvestmentType::Bonds => sector_bonds(sector),
            };
            out.extend(symbols.iter().copied());
        }
    }
    out.into_iter().map(str::to_string).collect()
}
