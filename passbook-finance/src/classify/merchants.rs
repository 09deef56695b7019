//! Merchant alias table and canonicalisation.
//!
//! Matching discipline:
//! 1. exact key: the whole narration/candidate name compacts to a merchant key
//! 2. alias: short aliases (<= 4 chars) need an exact token or a bounded
//!    phrase, longer aliases may match as substrings; longest alias wins
//! 3. fuzzy: one or two edits away from a key of 5+ chars

use std::collections::BTreeMap;
use std::sync::LazyLock;

use passbook_core::Category;

use super::normalize::NormalizedNarration;

/// What sort of business a merchant is, beyond its spend category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerchantKind {
    Retail,
    Insurer,
    Broker,
    Crypto,
    Lender,
    Government,
}

#[derive(Debug)]
pub struct MerchantEntry {
    pub canonical: &'static str,
    pub category: Category,
    pub kind: MerchantKind,
    pub aliases: &'static [&'static str],
}

const fn m(
    canonical: &'static str,
    category: Category,
    aliases: &'static [&'static str],
) -> MerchantEntry {
    MerchantEntry {
        canonical,
        category,
        kind: MerchantKind::Retail,
        aliases,
    }
}

const fn mk(
    canonical: &'static str,
    category: Category,
    kind: MerchantKind,
    aliases: &'static [&'static str],
) -> MerchantEntry {
    MerchantEntry {
        canonical,
        category,
        kind,
        aliases,
    }
}

use Category::*;
use MerchantKind::*;

pub static MERCHANTS: &[MerchantEntry] = &[
    // Food delivery
    m("Swiggy", FoodDelivery, &["SWIGGY", "BUNDL TECHNOLOGIES"]),
    m("Zomato", FoodDelivery, &["ZOMATO", "ZOMATO MEDIA"]),
    m("EatSure", FoodDelivery, &["EATSURE", "REBEL FOODS", "FAASOS"]),
    m("Box8", FoodDelivery, &["BOX8"]),
    // Dining
    m("Starbucks", Dining, &["STARBUCKS", "TATA STARBUCKS"]),
    m("McDonald's", Dining, &["MCDONALDS", "MC DONALDS", "HARDCASTLE RESTAURANTS", "CONNAUGHT PLAZA RESTAURANTS"]),
    m("KFC", Dining, &["KFC", "DEVYANI INTERNATIONAL"]),
    m("Domino's", Dining, &["DOMINOS", "JUBILANT FOODWORKS"]),
    m("Pizza Hut", Dining, &["PIZZA HUT", "PIZZAHUT"]),
    m("Burger King", Dining, &["BURGER KING", "RESTAURANT BRANDS ASIA"]),
    m("Subway", Dining, &["SUBWAY"]),
    m("Cafe Coffee Day", Dining, &["CAFE COFFEE DAY", "COFFEE DAY", "CCD"]),
    m("Haldiram's", Dining, &["HALDIRAM"]),
    m("Barbeque Nation", Dining, &["BARBEQUE NATION"]),
    m("Chaayos", Dining, &["CHAAYOS"]),
    m("Third Wave Coffee", Dining, &["THIRD WAVE COFFEE"]),
    // Groceries, including quick commerce and dairy (dairy is groceries, not dining)
    m("BigBasket", Groceries, &["BIGBASKET", "BIG BASKET", "SUPERMARKET GROCERY SUPPLIES", "INNOVATIVE RETAIL CONCEPTS"]),
    m("Blinkit", Groceries, &["BLINKIT", "GROFERS", "BLINK COMMERCE"]),
    m("Zepto", Groceries, &["ZEPTO", "KIRANAKART"]),
    m("Swiggy Instamart", Groceries, &["SWIGGY INSTAMART", "INSTAMART"]),
    m("JioMart", Groceries, &["JIOMART", "JIO MART"]),
    m("DMart", Groceries, &["DMART", "D MART", "AVENUE SUPERMARTS"]),
    m("More Retail", Groceries, &["MORE RETAIL", "MORE SUPERMARKET"]),
    m("Spencer's", Groceries, &["SPENCERS", "SPENCER S RETAIL"]),
    m("Nature's Basket", Groceries, &["NATURES BASKET"]),
    m("Reliance Fresh", Groceries, &["RELIANCE FRESH", "RELIANCE SMART"]),
    m("Dunzo", Groceries, &["DUNZO"]),
    m("Country Delight", Groceries, &["COUNTRY DELIGHT", "COUNTRYDELIGHT"]),
    m("Milkbasket", Groceries, &["MILKBASKET", "MILK BASKET"]),
    m("Amul", Groceries, &["AMUL", "KAIRA DISTRICT"]),
    m("Mother Dairy", Groceries, &["MOTHER DAIRY", "MOTHERDAIRY"]),
    m("Nandini", Groceries, &["NANDINI MILK", "KMF NANDINI", "NANDINI DAIRY"]),
    m("Aavin", Groceries, &["AAVIN"]),
    m("Heritage Foods", Groceries, &["HERITAGE FOODS", "HERITAGE DAIRY"]),
    m("Milky Mist", Groceries, &["MILKY MIST"]),
    // Shopping
    m("Amazon", Shopping, &["AMAZON", "AMZN", "AMAZON SELLER SERVICES", "AMAZON INDIA", "AMAZON PAY"]),
    m("Flipkart", Shopping, &["FLIPKART", "FKRT", "FLIPKART INTERNET"]),
    m("Myntra", Shopping, &["MYNTRA"]),
    m("Ajio", Shopping, &["AJIO"]),
    m("Nykaa", Shopping, &["NYKAA", "FSN E-COMMERCE"]),
    m("Meesho", Shopping, &["MEESHO", "FASHNEAR"]),
    m("Tata CLiQ", Shopping, &["TATACLIQ", "TATA CLIQ"]),
    m("Snapdeal", Shopping, &["SNAPDEAL"]),
    m("Croma", Shopping, &["CROMA", "INFINITI RETAIL"]),
    m("Reliance Digital", Shopping, &["RELIANCE DIGITAL"]),
    m("Decathlon", Shopping, &["DECATHLON"]),
    m("IKEA", Shopping, &["IKEA"]),
    m("Lenskart", Shopping, &["LENSKART"]),
    m("FirstCry", Shopping, &["FIRSTCRY"]),
    m("Shoppers Stop", Shopping, &["SHOPPERS STOP"]),
    m("Westside", Shopping, &["WESTSIDE", "TRENT LTD"]),
    m("Apple Store", Shopping, &["APPLE INDIA", "APPLE STORE"]),
    // Travel: cabs, rail, air, hotels
    m("Uber", Travel, &["UBER", "UBER INDIA"]),
    m("Ola", Travel, &["OLA", "OLACABS", "ANI TECHNOLOGIES"]),
    m("Rapido", Travel, &["RAPIDO", "ROPPEN TRANSPORTATION"]),
    m("BluSmart", Travel, &["BLUSMART"]),
    m("IRCTC", Travel, &["IRCTC"]),
    m("MakeMyTrip", Travel, &["MAKEMYTRIP", "MAKE MY TRIP"]),
    m("Goibibo", Travel, &["GOIBIBO", "IBIBO"]),
    m("Cleartrip", Travel, &["CLEARTRIP"]),
    m("Yatra", Travel, &["YATRA"]),
    m("EaseMyTrip", Travel, &["EASEMYTRIP", "EASE MY TRIP"]),
    m("IndiGo", Travel, &["INDIGO", "INTERGLOBE AVIATION"]),
    m("Air India", Travel, &["AIR INDIA", "AIRINDIA"]),
    m("Vistara", Travel, &["VISTARA"]),
    m("SpiceJet", Travel, &["SPICEJET"]),
    m("Akasa Air", Travel, &["AKASA"]),
    m("OYO", Travel, &["OYO", "OYO ROOMS", "ORAVEL STAYS"]),
    m("Airbnb", Travel, &["AIRBNB"]),
    m("Booking.com", Travel, &["BOOKING COM", "BOOKINGCOM"]),
    m("redBus", Travel, &["REDBUS"]),
    // Fuel
    m("Indian Oil", Fuel, &["INDIAN OIL", "INDIANOIL", "IOCL"]),
    m("HPCL", Fuel, &["HPCL", "HINDUSTAN PETROLEUM"]),
    m("BPCL", Fuel, &["BPCL", "BHARAT PETROLEUM"]),
    m("Shell", Fuel, &["SHELL INDIA", "SHELL PETROL", "SHELL"]),
    m("Nayara Energy", Fuel, &["NAYARA"]),
    m("Jio-bp", Fuel, &["JIO BP", "JIOBP", "RELIANCE BP"]),
    // Utilities: electricity
    m("Tata Power", BillsUtilities, &["TATA POWER", "TATAPOWER"]),
    m("Adani Electricity", BillsUtilities, &["ADANI ELECTRICITY", "AEML"]),
    m("BESCOM", BillsUtilities, &["BESCOM"]),
    m("MSEDCL", BillsUtilities, &["MSEDCL", "MAHAVITARAN", "MAHADISCOM"]),
    m("TANGEDCO", BillsUtilities, &["TANGEDCO", "TNEB"]),
    m("BSES", BillsUtilities, &["BSES"]),
    m("CESC", BillsUtilities, &["CESC"]),
    m("Torrent Power", BillsUtilities, &["TORRENT POWER"]),
    // Utilities: gas
    m("Indane", BillsUtilities, &["INDANE"]),
    m("HP Gas", BillsUtilities, &["HP GAS", "HPGAS"]),
    m("Bharat Gas", BillsUtilities, &["BHARAT GAS", "BHARATGAS"]),
    m("Mahanagar Gas", BillsUtilities, &["MAHANAGAR GAS", "MGL"]),
    m("Indraprastha Gas", BillsUtilities, &["INDRAPRASTHA GAS", "IGL"]),
    m("Adani Total Gas", BillsUtilities, &["ADANI GAS", "ADANI TOTAL GAS"]),
    // Utilities: telecom, broadband, DTH
    m("Airtel", BillsUtilities, &["AIRTEL", "BHARTI AIRTEL", "BHARTI HEXACOM"]),
    m("Jio", BillsUtilities, &["RELIANCE JIO", "JIO PREPAID", "JIO POSTPAID", "JIO RECHARGE", "JIOFIBER", "JIO FIBER"]),
    m("Vi", BillsUtilities, &["VODAFONE", "VODAFONE IDEA", "IDEA CELLULAR"]),
    m("BSNL", BillsUtilities, &["BSNL"]),
    m("ACT Fibernet", BillsUtilities, &["ACT FIBERNET", "ATRIA CONVERGENCE"]),
    m("Hathway", BillsUtilities, &["HATHWAY"]),
    m("Tata Play", BillsUtilities, &["TATA PLAY", "TATA SKY", "TATASKY"]),
    m("Dish TV", BillsUtilities, &["DISH TV", "DISHTV"]),
    m("CRED", BillsUtilities, &["CRED", "DREAMPLUG"]),
    // Insurance (billed like a utility)
    mk("LIC", BillsUtilities, Insurer, &["LIC", "LICI", "LIFE INSURANCE CORP"]),
    mk("HDFC Life", BillsUtilities, Insurer, &["HDFC LIFE", "HDFC STANDARD LIFE"]),
    mk("ICICI Prudential Life", BillsUtilities, Insurer, &["ICICI PRU", "ICICI PRUDENTIAL LIFE", "ICICIPRU"]),
    mk("SBI Life", BillsUtilities, Insurer, &["SBI LIFE"]),
    mk("Max Life", BillsUtilities, Insurer, &["MAX LIFE"]),
    mk("Tata AIA", BillsUtilities, Insurer, &["TATA AIA"]),
    mk("Bajaj Allianz", BillsUtilities, Insurer, &["BAJAJ ALLIANZ"]),
    mk("Star Health", BillsUtilities, Insurer, &["STAR HEALTH"]),
    mk("Niva Bupa", BillsUtilities, Insurer, &["NIVA BUPA", "MAX BUPA"]),
    mk("Care Health", BillsUtilities, Insurer, &["CARE HEALTH", "RELIGARE HEALTH"]),
    mk("HDFC Ergo", BillsUtilities, Insurer, &["HDFC ERGO"]),
    mk("ICICI Lombard", BillsUtilities, Insurer, &["ICICI LOMBARD"]),
    mk("Digit Insurance", BillsUtilities, Insurer, &["GO DIGIT"]),
    mk("Acko", BillsUtilities, Insurer, &["ACKO"]),
    mk("PolicyBazaar", BillsUtilities, Insurer, &["POLICYBAZAAR", "POLICY BAZAAR"]),
    // Healthcare
    m("Apollo Pharmacy", Healthcare, &["APOLLO PHARMACY", "APOLLO PHARMA"]),
    m("Apollo Hospitals", Healthcare, &["APOLLO HOSPITAL"]),
    m("MedPlus", Healthcare, &["MEDPLUS"]),
    m("Netmeds", Healthcare, &["NETMEDS"]),
    m("PharmEasy", Healthcare, &["PHARMEASY"]),
    m("Tata 1mg", Healthcare, &["1MG", "TATA 1MG"]),
    m("Wellness Forever", Healthcare, &["WELLNESS FOREVER"]),
    m("Practo", Healthcare, &["PRACTO"]),
    m("Fortis", Healthcare, &["FORTIS"]),
    m("Max Healthcare", Healthcare, &["MAX HEALTHCARE", "MAX HOSPITAL"]),
    m("Manipal Hospitals", Healthcare, &["MANIPAL HOSPITAL"]),
    m("Dr Lal PathLabs", Healthcare, &["LAL PATHLABS", "LALPATH"]),
    m("Thyrocare", Healthcare, &["THYROCARE"]),
    m("Cult.fit", Healthcare, &["CULTFIT", "CULT FIT", "CUREFIT"]),
    // Streaming and entertainment
    m("Netflix", Entertainment, &["NETFLIX"]),
    m("Amazon Prime", Entertainment, &["AMAZON PRIME", "AMAZONPRIME", "PRIME VIDEO"]),
    m("Disney+ Hotstar", Entertainment, &["HOTSTAR", "DISNEY", "NOVI DIGITAL"]),
    m("Spotify", Entertainment, &["SPOTIFY"]),
    m("YouTube Premium", Entertainment, &["YOUTUBE", "GOOGLE YOUTUBE"]),
    m("SonyLIV", Entertainment, &["SONYLIV", "SONY LIV"]),
    m("ZEE5", Entertainment, &["ZEE5"]),
    m("JioCinema", Entertainment, &["JIOCINEMA", "JIO CINEMA"]),
    m("BookMyShow", Entertainment, &["BOOKMYSHOW", "BIGTREE ENTERTAINMENT"]),
    m("PVR INOX", Entertainment, &["PVR", "INOX", "PVR INOX"]),
    m("Apple Services", Entertainment, &["APPLE MEDIA", "APPLE COM BILL", "ITUNES"]),
    m("Google Play", Entertainment, &["GOOGLE PLAY", "PLAY STORE"]),
    m("Dream11", Entertainment, &["DREAM11", "SPORTA TECHNOLOGIES"]),
    // Education
    m("BYJU'S", Education, &["BYJU", "THINK AND LEARN"]),
    m("Unacademy", Education, &["UNACADEMY", "SORTING HAT"]),
    m("Vedantu", Education, &["VEDANTU"]),
    m("Coursera", Education, &["COURSERA"]),
    m("Udemy", Education, &["UDEMY"]),
    m("upGrad", Education, &["UPGRAD"]),
    m("Simplilearn", Education, &["SIMPLILEARN"]),
    m("Physics Wallah", Education, &["PHYSICSWALLAH", "PHYSICS WALLAH"]),
    m("Great Learning", Education, &["GREAT LEARNING"]),
    m("Scaler", Education, &["SCALER ACADEMY", "INTERVIEWBIT"]),
    m("Duolingo", Education, &["DUOLINGO"]),
    // Brokers, clearing corporations, registrars and fund houses
    mk("Zerodha", Investment, Broker, &["ZERODHA", "ZERODHA BROKING"]),
    mk("Groww", Investment, Broker, &["GROWW", "NEXTBILLION TECHNOLOGY"]),
    mk("Upstox", Investment, Broker, &["UPSTOX", "RKSV SECURITIES"]),
    mk("Angel One", Investment, Broker, &["ANGEL ONE", "ANGEL BROKING", "ANGELONE"]),
    mk("ICICI Direct", Investment, Broker, &["ICICIDIRECT", "ICICI SECURITIES"]),
    mk("HDFC Securities", Investment, Broker, &["HDFC SECURITIES", "HDFCSEC"]),
    mk("Kotak Securities", Investment, Broker, &["KOTAK SECURITIES"]),
    mk("5paisa", Investment, Broker, &["5PAISA"]),
    mk("Paytm Money", Investment, Broker, &["PAYTM MONEY", "PAYTMMONEY"]),
    mk("Kuvera", Investment, Broker, &["KUVERA"]),
    mk("Motilal Oswal", Investment, Broker, &["MOTILAL OSWAL"]),
    mk("Sharekhan", Investment, Broker, &["SHAREKHAN"]),
    mk("INDmoney", Investment, Broker, &["INDMONEY", "FINZOOM"]),
    mk("Indian Clearing Corporation", Investment, Broker, &["INDIAN CLEARING CORP", "ICCL"]),
    mk("NSE Clearing", Investment, Broker, &["NSE CLEARING", "NSCCL"]),
    mk("BSE StAR MF", Investment, Broker, &["BSE STAR MF", "BSESTARMF"]),
    mk("CAMS", Investment, Broker, &["CAMS", "COMPUTER AGE MANAGEMENT"]),
    mk("KFintech", Investment, Broker, &["KFINTECH", "KFIN TECHNOLOGIES", "KARVY"]),
    mk("SBI Mutual Fund", Investment, Broker, &["SBI MUTUAL FUND", "SBIMF", "SBI MF"]),
    mk("HDFC Mutual Fund", Investment, Broker, &["HDFC MUTUAL FUND", "HDFCMF", "HDFC MF"]),
    mk("ICICI Prudential MF", Investment, Broker, &["ICICI PRUDENTIAL MUTUAL FUND", "ICICI PRU MF", "ICICI PRUDENTIAL MF"]),
    mk("Axis Mutual Fund", Investment, Broker, &["AXIS MUTUAL FUND", "AXIS MF"]),
    mk("Nippon India MF", Investment, Broker, &["NIPPON INDIA", "NIPPON MF"]),
    mk("Mirae Asset", Investment, Broker, &["MIRAE ASSET"]),
    mk("PPFAS Mutual Fund", Investment, Broker, &["PARAG PARIKH", "PPFAS"]),
    mk("NPS Trust", Investment, Broker, &["NPS TRUST", "PROTEAN NPS", "NPSCRA"]),
    // Crypto exchanges, keyed by their legal entity names too
    mk("WazirX", Investment, Crypto, &["WAZIRX", "ZANMAI LABS"]),
    mk("CoinDCX", Investment, Crypto, &["COINDCX", "NEBLIO TECHNOLOGIES"]),
    mk("CoinSwitch", Investment, Crypto, &["COINSWITCH", "BITCIPHER LABS"]),
    mk("ZebPay", Investment, Crypto, &["ZEBPAY", "ZEB IT SERVICE"]),
    mk("Mudrex", Investment, Crypto, &["MUDREX"]),
    mk("Bitbns", Investment, Crypto, &["BITBNS", "BUYHATKE"]),
    mk("Giottus", Investment, Crypto, &["GIOTTUS"]),
    mk("Binance", Investment, Crypto, &["BINANCE"]),
    mk("Coinbase", Investment, Crypto, &["COINBASE"]),
    mk("Kraken", Investment, Crypto, &["KRAKEN", "PAYWARD"]),
    mk("KuCoin", Investment, Crypto, &["KUCOIN", "MEK GLOBAL"]),
    mk("OKX", Investment, Crypto, &["OKX", "AUX CAYES"]),
    mk("Bybit", Investment, Crypto, &["BYBIT"]),
    // Lenders and BNPL
    mk("Bajaj Finance", Loan, Lender, &["BAJAJ FINANCE", "BAJAJ FINSERV", "BAJAJFIN"]),
    mk("Home Credit", Loan, Lender, &["HOME CREDIT"]),
    mk("Tata Capital", Loan, Lender, &["TATA CAPITAL"]),
    mk("LazyPay", Loan, Lender, &["LAZYPAY"]),
    mk("Simpl", Loan, Lender, &["GET SIMPL", "SIMPL"]),
    mk("Slice", Loan, Lender, &["SLICEPAY", "SLICE CARD"]),
    mk("KreditBee", Loan, Lender, &["KREDITBEE"]),
    mk("MoneyView", Loan, Lender, &["MONEYVIEW"]),
    mk("Navi", Loan, Lender, &["NAVI FINSERV", "NAVI TECHNOLOGIES"]),
    // Tax
    mk("Income Tax Department", Other, Government, &["INCOME TAX", "CBDT", "TIN NSDL", "OLTAS"]),
    mk("GST", Other, Government, &["GSTN", "GST PAYMENT"]),
];

/// Tokens that are common narration words and must never fuzzy-match a merchant.
const FUZZY_STOPWORDS: &[&str] = &[
    "PAYMENT", "TRANSFER", "CREDIT", "DEBIT", "CHARGES", "SHELF", "SMALL", "ONLINE", "MONEY",
    "PAYEE", "PAYTM", "INDIA", "BANKS", "SALES", "STORE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Alias,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MerchantMatch {
    pub canonical: &'static str,
    pub category: Category,
    pub kind: MerchantKind,
    pub match_kind: MatchKind,
    /// The alias or key that matched
    pub matched: String,
    pub confidence: f64,
}

pub struct MerchantCanonicalizer {
    /// Compact key (alphanumerics only) -> entry index
    keys: BTreeMap<String, usize>,
}

static CANONICALIZER: LazyLock<MerchantCanonicalizer> = LazyLock::new(MerchantCanonicalizer::new);

pub fn canonicalizer() -> &'static MerchantCanonicalizer {
    &CANONICALIZER
}

fn compact(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl MerchantCanonicalizer {
    pub fn new() -> Self {
        let mut keys = BTreeMap::new();
        for (i, entry) in MERCHANTS.iter().enumerate() {
            keys.entry(compact(entry.canonical)).or_insert(i);
        }
        Self { keys }
    }

    pub fn entry(&self, canonical: &str) -> Option<&'static MerchantEntry> {
        self.keys.get(&compact(canonical)).map(|&i| &MERCHANTS[i])
    }

    /// Resolve a narration (and optionally an extracted counterparty name) to a merchant.
    pub fn canonicalize(
        &self,
        n: &NormalizedNarration,
        candidate: Option<&str>,
    ) -> Option<MerchantMatch> {
        if let Some(hit) = self.exact(n, candidate) {
            return Some(hit);
        }
        if let Some(hit) = self.best_alias(n) {
            return Some(hit);
        }
        self.fuzzy(n)
    }

    fn exact(&self, n: &NormalizedNarration, candidate: Option<&str>) -> Option<MerchantMatch> {
        let mut probes = vec![compact(&n.cleaned)];
        if let Some(c) = candidate {
            probes.push(compact(c));
        }
        probes.into_iter().find_map(|probe| {
            let &i = self.keys.get(&probe)?;
            Some(self.hit(i, MatchKind::Exact, probe, 0.95))
        })
    }

    fn best_alias(&self, n: &NormalizedNarration) -> Option<MerchantMatch> {
        let mut best: Option<(usize, &'static str)> = None;
        for (i, entry) in MERCHANTS.iter().enumerate() {
            for alias in entry.aliases {
                if !n.matches_keyword(alias) {
                    continue;
                }
                // Longest alias is the most specific; ties keep table order.
                if best.is_none_or(|(_, b)| alias.len() > b.len()) {
                    best = Some((i, alias));
                }
            }
        }
        let (i, alias) = best?;
        let confidence = if alias.len() <= 4 { 0.85 } else { 0.9 };
        Some(self.hit(i, MatchKind::Alias, alias.to_string(), confidence))
    }

    fn fuzzy(&self, n: &NormalizedNarration) -> Option<MerchantMatch> {
        for token in &n.tokens {
            if token.len() < 5
                || token.chars().any(|c| c.is_ascii_digit())
                || FUZZY_STOPWORDS.contains(&token.as_str())
            {
                continue;
            }
            for (key, &i) in &self.keys {
                if key.len() < 5 || key.as_bytes()[0] != token.as_bytes()[0] {
                    continue;
                }
                let budget = if key.len() >= 8 { 2 } else { 1 };
                if key.len().abs_diff(token.len()) > budget {
                    continue;
                }
                if levenshtein(key, token) <= budget {
                    return Some(self.hit(i, MatchKind::Fuzzy, token.clone(), 0.7));
                }
            }
        }
        None
    }

    fn hit(&self, i: usize, match_kind: MatchKind, matched: String, confidence: f64) -> MerchantMatch {
        let entry = &MERCHANTS[i];
        MerchantMatch {
            canonical: entry.canonical,
            category: entry.category,
            kind: entry.kind,
            match_kind,
            matched,
            confidence,
        }
    }
}

impl Default for MerchantCanonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0; b.len() + 1];
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::normalize::normalize;

    fn lookup(s: &str) -> Option<MerchantMatch> {
        canonicalizer().canonicalize(&normalize(s), None)
    }

    #[test]
    fn test_exact_key() {
        let hit = lookup("NETFLIX").unwrap();
        assert_eq!(hit.canonical, "Netflix");
        assert_eq!(hit.match_kind, MatchKind::Exact);
        assert_eq!(hit.confidence, 0.95);
    }

    #[test]
    fn test_legal_entity_alias() {
        let hit = lookup("IMPS-ZANMAI LABS PRIVATE LIMITED-REF 99812").unwrap();
        assert_eq!(hit.canonical, "WazirX");
        assert_eq!(hit.category, Category::Investment);
        assert_eq!(hit.kind, MerchantKind::Crypto);
    }

    #[test]
    fn test_longest_alias_wins() {
        assert_eq!(lookup("UPI-SWIGGY INSTAMART-swiggy@icici").unwrap().canonical, "Swiggy Instamart");
        assert_eq!(lookup("UPI-SWIGGY-swiggy@icici").unwrap().canonical, "Swiggy");
        assert_eq!(lookup("NACH AMAZON PRIME MEMBERSHIP").unwrap().canonical, "Amazon Prime");
    }

    #[test]
    fn test_dairy_is_groceries() {
        let hit = lookup("UPI-MOTHER DAIRY FRUIT VEG-md@ybl").unwrap();
        assert_eq!(hit.category, Category::Groceries);
    }

    #[test]
    fn test_short_alias_guard() {
        // "OLA" must not match inside "COLA" or "NICOLAS"
        assert!(lookup("POS COCA COLA BOTTLING").is_none_or(|h| h.canonical != "Ola"));
        assert!(lookup("UPI-NICOLAS DCRUZ-nico@ybl").is_none());
        assert_eq!(lookup("UPI-OLA-ola@ybl").unwrap().canonical, "Ola");
    }

    #[test]
    fn test_fuzzy_only_for_long_keys() {
        let hit = lookup("POS ZOMTO ORDER").unwrap();
        assert_eq!(hit.canonical, "Zomato");
        assert_eq!(hit.match_kind, MatchKind::Fuzzy);
        assert!(hit.confidence < 0.8);
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("SWIGGY", "SWIGY"), 1);
        assert_eq!(levenshtein("ZOMATO", "ZOMTAO"), 2);
        assert_eq!(levenshtein("", "ABC"), 3);
    }

    #[test]
    fn test_every_alias_is_uppercase() {
        for entry in MERCHANTS {
            for alias in entry.aliases {
                assert_eq!(*alias, alias.to_uppercase(), "alias {alias} of {}", entry.canonical);
            }
        }
    }
}
