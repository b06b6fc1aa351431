//! Static nationality and continent reference tables.
//!
//! Tables are immutable and built once on first use; lookups are safe from any
//! number of threads without synchronization.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::{Continent, UNDEFINED};

/// A raw nationality string as it appears in the roster, and the country it
/// resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NationalityEntry {
    pub raw: &'static str,
    pub country: &'static str,
    pub country_en: &'static str,
}

impl NationalityEntry {
    const fn new(raw: &'static str, country: &'static str, country_en: &'static str) -> Self {
        Self { raw, country, country_en }
    }

    pub fn continent(&self) -> Continent {
        country_to_continent(self.country)
    }
}

/// Placeholder nationalities (stateless, residents, "under processing") all
/// resolve to the `UNDEFINED` country.
pub const NATIONALITIES: &[NationalityEntry] = &[
    NationalityEntry::new("أردني", "الأردن", "Jordan"),
    NationalityEntry::new("ألماني", "ألمانيا", "Germany"),
    NationalityEntry::new("أمريكي", "الولايات المتحدة الأمريكية", "United States"),
    NationalityEntry::new("أوزبكستاني", "أوزبكستان", "Uzbekistan"),
    NationalityEntry::new("أوغندي", "أوغندا", "Uganda"),
    NationalityEntry::new("أوكراني", "أوكرانيا", "Ukraine"),
    NationalityEntry::new("إماراتي", "الإمارات العربية المتحدة", "United Arab Emirates"),
    NationalityEntry::new("اثيوبي", "إثيوبيا", "Ethiopia"),
    NationalityEntry::new("اذربيجاني", "أذربيجان", "Azerbaijan"),
    NationalityEntry::new("ارجنتيني", "الأرجنتين", "Argentina"),
    NationalityEntry::new("اريتيري", "إريتريا", "Eritrea"),
    NationalityEntry::new("استرالي", "أستراليا", "Australia"),
    NationalityEntry::new("افغانستاني", "أفغانستان", "Afghanistan"),
    NationalityEntry::new("الاتحاد الأوروبي ", "الاتحاد الأوروبي", "Europe"),
    NationalityEntry::new("الباني", "ألبانيا", "Albania"),
    NationalityEntry::new("الجبل الاسود", "الجبل الأسود", "Montenegro"),
    NationalityEntry::new("الجنسية تحت الإجراء", "غير محدد", "Undefined"),
    NationalityEntry::new("القبائل النازح", "غير محدد", "Undefined"),
    NationalityEntry::new("القبائل النازحة", "غير محدد", "Undefined"),
    NationalityEntry::new("الكنغو", "الكونغو", "Congo"),
    NationalityEntry::new("المملكة المتحدة والجزر الشمالي", "المملكة المتحدة", "United Kingdom"),
    NationalityEntry::new("اليابان", "اليابان", "Japan"),
    NationalityEntry::new("اندونيسي", "إندونيسيا", "Indonesia"),
    NationalityEntry::new("ايراني", "إيران", "Iran"),
    NationalityEntry::new("ايطالي", "إيطاليا", "Italy"),
    NationalityEntry::new("باكستاني", "باكستان", "Pakistan"),
    NationalityEntry::new("بحريني", "البحرين", "Bahrain"),
    NationalityEntry::new("بدون", "غير محدد", "Undefined"),
    NationalityEntry::new("برتغالي", "البرتغال", "Portugal"),
    NationalityEntry::new("بريطاني", "المملكة المتحدة", "United Kingdom"),
    NationalityEntry::new("بلجيكي", "بلجيكا", "Belgium"),
    NationalityEntry::new("بلغاري", "بلغاريا", "Bulgaria"),
    NationalityEntry::new("بنغلاديشي", "بنغلاديش", "Bangladesh"),
    NationalityEntry::new("بنيني", "بنين", "Benin"),
    NationalityEntry::new("بوركيني", "بوركينا فاسو", "Burkina Faso"),
    NationalityEntry::new("بوروندي ", "بوروندي", "Burundi"),
    NationalityEntry::new("بوسني", "البوسنة والهرسك", "Bosnia and Herzegovina"),
    NationalityEntry::new("بولندي", "بولندا", "Poland"),
    NationalityEntry::new("بيلاروسي", "بيلاروسيا", "Belarus"),
    NationalityEntry::new("تايلندي", "تايلاند", "Thailand"),
    NationalityEntry::new("تركستاني", "تركستان", "Turkestan"),
    NationalityEntry::new("تركمنستاني", "تركمانستان", "Turkmenistan"),
    NationalityEntry::new("تركي", "تركيا", "Turkey"),
    NationalityEntry::new("ترينيداد وتوباغو ", "ترينيداد وتوباغو", "Trinidad and Tobago"),
    NationalityEntry::new("تشادي", "تشاد", "Chad"),
    NationalityEntry::new("تنزاني", "تنزانيا", "Tanzania"),
    NationalityEntry::new("توغوي", "توغو", "Togo"),
    NationalityEntry::new("تونسي", "تونس", "Tunisia"),
    NationalityEntry::new("ج أفريقيا الوسطى", "جمهورية أفريقيا الوسطى", "Central African Republic"),
    NationalityEntry::new("جامايكي", "جامايكا", "Jamaica"),
    NationalityEntry::new("جزائري", "الجزائر", "Algeria"),
    NationalityEntry::new("جزر القمر ", "جزر القمر", "Comoros"),
    NationalityEntry::new("جزر فيرجين البريطانية ", "جزر فيرجن البريطانية", "British Virgin Islands"),
    NationalityEntry::new("جنوب افريقي", "جنوب أفريقيا", "South Africa"),
    NationalityEntry::new("جورجي", "جورجيا", "Georgia"),
    NationalityEntry::new("جيبوتي", "جيبوتي", "Djibouti"),
    NationalityEntry::new("دانمركي", "الدنمارك", "Denmark"),
    NationalityEntry::new("دومينيكي", "جمهورية الدومينيكان", "Dominican Republic"),
    NationalityEntry::new("رواندي", "رواندا", "Rwanda"),
    NationalityEntry::new("روسي", "روسيا", "Russia"),
    NationalityEntry::new("زمبابوي ", "زيمبابوي", "Zimbabwe"),
    NationalityEntry::new("سانت كيتس ونيفس ", "سانت كيتس ونيفيس", "Saint Kitts and Nevis"),
    NationalityEntry::new("سري لانكي", "سريلانكا", "Sri Lanka"),
    NationalityEntry::new("سعودي من جهة الأم", "السعودية", "Saudi Arabia"),
    NationalityEntry::new("سنغافوري", "سنغافورة", "Singapore"),
    NationalityEntry::new("سنغالي", "السنغال", "Senegal"),
    NationalityEntry::new("سوداني", "السودان", "Sudan"),
    NationalityEntry::new("سوري", "سوريا", "Syria"),
    NationalityEntry::new("سويدي", "السويد", "Sweden"),
    NationalityEntry::new("سويسري", "سويسرا", "Switzerland"),
    NationalityEntry::new("سيراليوني", "سيراليون", "Sierra Leone"),
    NationalityEntry::new("صربيا", "صربيا", "Serbia"),
    NationalityEntry::new("صومالي", "الصومال", "Somalia"),
    NationalityEntry::new("صيني", "الصين", "China"),
    NationalityEntry::new("طاجكستان", "طاجيكستان", "Tajikistan"),
    NationalityEntry::new("عاجي", "ساحل العاج", "Cote d'Ivoire"),
    NationalityEntry::new("عراقي", "العراق", "Iraq"),
    NationalityEntry::new("عماني", "عُمان", "Oman"),
    NationalityEntry::new("غابوني", "الغابون", "Gabon"),
    NationalityEntry::new("غامبي", "غامبيا", "Gambia"),
    NationalityEntry::new("غاني", "غانا", "Ghana"),
    NationalityEntry::new("غير سعودي", "غير محدد", "Undefined"),
    NationalityEntry::new("غيني", "غينيا", "Guinea"),
    NationalityEntry::new("غينيا - بيساو ", "غينيا بيساو", "Guinea-Bissau"),
    NationalityEntry::new("غينيا الاستوائية", "غينيا الاستوائية", "Equatorial Guinea"),
    NationalityEntry::new("فرنسي", "فرنسا", "France"),
    NationalityEntry::new("فلبيني", "الفلبين", "Philippines"),
    NationalityEntry::new("فلسطيني", "فلسطين", "Palestine"),
    NationalityEntry::new("فلسطينية بوثيقة مصري", "فلسطين", "Palestine"),
    NationalityEntry::new("فنلندي", "فنلندا", "Finland"),
    NationalityEntry::new("قبائل نازحة / الحليفه", "غير محدد", "Undefined"),
    NationalityEntry::new("قبائل نازحة / الكويت", "غير محدد", "Undefined"),
    NationalityEntry::new("قطري", "قطر", "Qatar"),
    NationalityEntry::new("قيرغيزستان ", "قيرغيزستان", "Kyrgyzstan"),
    NationalityEntry::new("كازاخستاني", "كازاخستان", "Kazakhstan"),
    NationalityEntry::new("كاميروني", "الكاميرون", "Cameroon"),
    NationalityEntry::new("كمبودي", "كمبوديا", "Cambodia"),
    NationalityEntry::new("كندي", "كندا", "Canada"),
    NationalityEntry::new("كوري", "كوريا", "South Korea"),
    NationalityEntry::new("كوسوفا", "كوسوفو", "Kosovo"),
    NationalityEntry::new("كونغوليا", "جمهورية الكونغو الديمقراطية", "Democratic Republic of the Congo"),
    NationalityEntry::new("كويتي", "الكويت", "Kuwait"),
    NationalityEntry::new("كيني", "كينيا", "Kenya"),
    NationalityEntry::new("لبناني", "لبنان", "Lebanon"),
    NationalityEntry::new("ليبي", "ليبيا", "Libya"),
    NationalityEntry::new("ليبيري", "ليبيريا", "Liberia"),
    NationalityEntry::new("مالديفي", "المالديف", "Maldives"),
    NationalityEntry::new("مالطي", "مالطا", "Malta"),
    NationalityEntry::new("مالي", "مالي", "Mali"),
    NationalityEntry::new("ماليزي", "ماليزيا", "Malaysia"),
    NationalityEntry::new("مجري", "المجر", "Hungary"),
    NationalityEntry::new("مدغشقري", "مدغشقر", "Madagascar"),
    NationalityEntry::new("مصري", "مصر", "Egypt"),
    NationalityEntry::new("مغربي", "المغرب", "Morocco"),
    NationalityEntry::new("مقدوني", "مقدونيا الشمالية", "North Macedonia"),
    NationalityEntry::new("مقيم", "غير محدد", "Undefined"),
    NationalityEntry::new("مقيم / نازح", "غير محدد", "Undefined"),
    NationalityEntry::new("مقيم بلوشي", "غير محدد", "Undefined"),
    NationalityEntry::new("منغولي", "منغوليا", "Mongolia"),
    NationalityEntry::new("موريتاني", "موريتانيا", "Mauritania"),
    NationalityEntry::new("موزامبيقي", "موزمبيق", "Mozambique"),
    NationalityEntry::new("ميانمار/جواز باكستاني", "ميانمار", "Myanmar"),
    NationalityEntry::new("ميانماري", "ميانمار", "Myanmar"),
    NationalityEntry::new("نازح", "غير محدد", "Undefined"),
    NationalityEntry::new("نرويجي", "النرويج", "Norway"),
    NationalityEntry::new("نمساوي", "النمسا", "Austria"),
    NationalityEntry::new("نيبالي", "نيبال", "Nepal"),
    NationalityEntry::new("نيجري", "النيجر", "Niger"),
    NationalityEntry::new("نيجيري", "نيجيريا", "Nigeria"),
    NationalityEntry::new("نيوزيلندي", "نيوزيلندا", "New Zealand"),
    NationalityEntry::new("هندي", "الهند", "India"),
    NationalityEntry::new("هولندي", "هولندا", "Netherlands"),
    NationalityEntry::new("يمني", "اليمن", "Yemen"),
    NationalityEntry::new("يوغوسلافيا", "يوغوسلافيا", "Yugoslavia"),
];

const CONTINENTS: &[(&str, Continent)] = &[
    ("غير محدد", Continent::Undefined),
    ("الأردن", Continent::Asia),
    ("ألمانيا", Continent::Europe),
    ("الولايات المتحدة الأمريكية", Continent::NorthAmerica),
    ("أوزبكستان", Continent::Asia),
    ("أوغندا", Continent::Africa),
    ("أوكرانيا", Continent::Europe),
    ("الإمارات العربية المتحدة", Continent::Asia),
    ("إثيوبيا", Continent::Africa),
    ("أذربيجان", Continent::Asia),
    ("الأرجنتين", Continent::SouthAmerica),
    ("إريتريا", Continent::Africa),
    ("أستراليا", Continent::Australia),
    ("أفغانستان", Continent::Asia),
    ("الاتحاد الأوروبي", Continent::Europe),
    ("ألبانيا", Continent::Europe),
    ("الجبل الأسود", Continent::Europe),
    ("الكونغو", Continent::Africa),
    ("المملكة المتحدة", Continent::Europe),
    ("اليابان", Continent::Asia),
    ("إندونيسيا", Continent::Asia),
    ("إيران", Continent::Asia),
    ("إيطاليا", Continent::Europe),
    ("باكستان", Continent::Asia),
    ("البحرين", Continent::Asia),
    ("البرتغال", Continent::Europe),
    ("بلجيكا", Continent::Europe),
    ("بلغاريا", Continent::Europe),
    ("بنغلاديش", Continent::Asia),
    ("بنين", Continent::Africa),
    ("بوركينا فاسو", Continent::Africa),
    ("بوروندي", Continent::Africa),
    ("البوسنة والهرسك", Continent::Europe),
    ("بولندا", Continent::Europe),
    ("بيلاروسيا", Continent::Europe),
    ("تايلاند", Continent::Asia),
    ("تركستان", Continent::Asia),
    ("تركمانستان", Continent::Asia),
    ("تركيا", Continent::Asia),
    ("ترينيداد وتوباغو", Continent::NorthAmerica),
    ("تشاد", Continent::Africa),
    ("تنزانيا", Continent::Africa),
    ("توغو", Continent::Africa),
    ("تونس", Continent::Africa),
    ("جمهورية أفريقيا الوسطى", Continent::Africa),
    ("جامايكا", Continent::NorthAmerica),
    ("الجزائر", Continent::Africa),
    ("جزر القمر", Continent::Africa),
    ("جزر فيرجن البريطانية", Continent::NorthAmerica),
    ("جنوب أفريقيا", Continent::Africa),
    ("جورجيا", Continent::Asia),
    ("جيبوتي", Continent::Africa),
    ("الدنمارك", Continent::Europe),
    ("جمهورية الدومينيكان", Continent::NorthAmerica),
    ("رواندا", Continent::Africa),
    ("روسيا", Continent::Europe),
    ("زيمبابوي", Continent::Africa),
    ("سانت كيتس ونيفيس", Continent::NorthAmerica),
    ("سريلانكا", Continent::Asia),
    ("السعودية", Continent::Asia),
    ("سنغافورة", Continent::Asia),
    ("السنغال", Continent::Africa),
    ("السودان", Continent::Africa),
    ("سوريا", Continent::Asia),
    ("السويد", Continent::Europe),
    ("سويسرا", Continent::Europe),
    ("سيراليون", Continent::Africa),
    ("صربيا", Continent::Europe),
    ("الصومال", Continent::Africa),
    ("الصين", Continent::Asia),
    ("طاجيكستان", Continent::Asia),
    ("ساحل العاج", Continent::Africa),
    ("العراق", Continent::Asia),
    ("عُمان", Continent::Asia),
    ("مصر", Continent::Africa),
    ("الغابون", Continent::Africa),
    ("غامبيا", Continent::Africa),
    ("غانا", Continent::Africa),
    ("غينيا", Continent::Africa),
    ("غينيا بيساو", Continent::Africa),
    ("غينيا الاستوائية", Continent::Africa),
    ("فرنسا", Continent::Europe),
    ("الفلبين", Continent::Asia),
    ("فلسطين", Continent::Asia),
    ("فنلندا", Continent::Europe),
    ("قطر", Continent::Asia),
    ("قيرغيزستان", Continent::Asia),
    ("كازاخستان", Continent::Asia),
    ("الكاميرون", Continent::Africa),
    ("كمبوديا", Continent::Asia),
    ("كندا", Continent::NorthAmerica),
    ("كوريا", Continent::Asia),
    ("كوسوفو", Continent::Europe),
    ("جمهورية الكونغو الديمقراطية", Continent::Africa),
    ("الكويت", Continent::Asia),
    ("كينيا", Continent::Africa),
    ("لبنان", Continent::Asia),
    ("ليبيا", Continent::Africa),
    ("ليبيريا", Continent::Africa),
    ("المالديف", Continent::Asia),
    ("مالطا", Continent::Europe),
    ("مالي", Continent::Africa),
    ("ماليزيا", Continent::Asia),
    ("المجر", Continent::Europe),
    ("مدغشقر", Continent::Africa),
    ("المغرب", Continent::Africa),
    ("مقدونيا الشمالية", Continent::Europe),
    ("منغوليا", Continent::Asia),
    ("موريتانيا", Continent::Africa),
    ("موزمبيق", Continent::Africa),
    ("ميانمار", Continent::Asia),
    ("النرويج", Continent::Europe),
    ("النمسا", Continent::Europe),
    ("نيبال", Continent::Asia),
    ("النيجر", Continent::Africa),
    ("نيجيريا", Continent::Africa),
    ("نيوزيلندا", Continent::Australia),
    ("الهند", Continent::Asia),
    ("هولندا", Continent::Europe),
    ("اليمن", Continent::Asia),
    ("يوغوسلافيا", Continent::Europe),
];

/// Collapses surrounding and repeated inner whitespace.
pub(crate) fn whitespace_key(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

static NATIONALITY_INDEX: LazyLock<HashMap<String, &'static NationalityEntry>> =
    LazyLock::new(|| {
        let mut index = HashMap::with_capacity(NATIONALITIES.len());
        for entry in NATIONALITIES {
            index.entry(whitespace_key(entry.raw)).or_insert(entry);
        }
        index
    });

static CONTINENT_INDEX: LazyLock<HashMap<&'static str, Continent>> =
    LazyLock::new(|| CONTINENTS.iter().copied().collect());

/// Local-script country name -> Latin display name. First entry wins; the
/// `UNDEFINED` sentinel is excluded.
static DISPLAY_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut names = HashMap::new();
    for entry in NATIONALITIES {
        if entry.country != UNDEFINED {
            names.entry(entry.country).or_insert(entry.country_en);
        }
    }
    names
});

/// Lower-cased Latin country name -> local-script country name.
static LATIN_NAMES: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let mut names = HashMap::new();
    for entry in NATIONALITIES {
        names
            .entry(entry.country_en.to_lowercase())
            .or_insert(entry.country);
    }
    names
});

/// Looks a raw nationality up: exact key first, then whitespace-insensitive.
pub fn lookup_nationality(raw: &str) -> Option<&'static NationalityEntry> {
    if let Some(entry) = NATIONALITIES.iter().find(|e| e.raw == raw) {
        return Some(entry);
    }
    NATIONALITY_INDEX.get(&whitespace_key(raw)).copied()
}

/// Maps a Latin-script country name (case-insensitive) back to its canonical
/// local-script form.
pub fn lookup_latin_name(name: &str) -> Option<&'static str> {
    LATIN_NAMES.get(&whitespace_key(name).to_lowercase()).copied()
}

pub fn country_to_continent(country: &str) -> Continent {
    CONTINENT_INDEX
        .get(country.trim())
        .copied()
        .unwrap_or(Continent::Undefined)
}

/// English name for map rendering. `None` means callers should fall back to
/// the local-script name.
pub fn country_display_name(country: &str) -> Option<&'static str> {
    DISPLAY_NAMES.get(country.trim()).copied()
}
