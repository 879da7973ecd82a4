use itertools::Itertools;

use crate::settings::QuestionKind;

/// Decade a track is filed under, taken from its genre label
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Era {
    #[strum(serialize = "60s")]
    Sixties,
    #[strum(serialize = "70s")]
    Seventies,
    #[strum(serialize = "80s")]
    Eighties,
    #[strum(serialize = "90s")]
    Nineties,
    #[strum(serialize = "00s")]
    Noughties,
}

impl Era {
    pub const ALL: [Era; 5] = [
        Era::Sixties,
        Era::Seventies,
        Era::Eighties,
        Era::Nineties,
        Era::Noughties,
    ];

    /// First matching decade marker wins; labels without one count as the 80s
    pub fn classify(genre_label: &str) -> Era {
        let label = genre_label.to_lowercase();
        if label.contains("60") {
            Era::Sixties
        } else if label.contains("70") {
            Era::Seventies
        } else if label.contains("80") {
            Era::Eighties
        } else if label.contains("90") {
            Era::Nineties
        } else if label.contains("00") || label.contains("2000") {
            Era::Noughties
        } else {
            Era::Eighties
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GenreBucket {
    Turkish,
    Generic,
}

impl GenreBucket {
    pub fn classify(genre_label: &str) -> GenreBucket {
        let label = genre_label.to_lowercase();
        if label.contains("turkish") || label.contains("anatolia") {
            GenreBucket::Turkish
        } else {
            GenreBucket::Generic
        }
    }
}

type Pool = &'static [&'static str];

const SONGS: [Pool; 5] = [
    &[
        "House Of The Rising Sun",
        "Purple Haze",
        "Born To Be Wild",
        "Light My Fire",
        "Fortunate Son",
        "Good Vibrations",
        "Satisfaction",
        "Gimme Shelter",
        "White Rabbit",
        "All Along The Watchtower",
    ],
    &[
        "Stairway To Heaven",
        "Hotel California",
        "Smoke On The Water",
        "Bohemian Rhapsody",
        "Black Dog",
        "Paranoid",
        "Another Brick In The Wall",
        "Dream On",
        "Layla",
        "Free Bird",
    ],
    &[
        "Sweet Child O' Mine",
        "Enter Sandman",
        "Back in Black",
        "Crazy Train",
        "Run To The Hills",
        "Breaking The Law",
        "You Give Love A Bad Name",
        "Welcome To The Jungle",
        "Master of Puppets",
        "Jump",
    ],
    &[
        "Nothing Else Matters",
        "Smells Like Teen Spirit",
        "Black Hole Sun",
        "Enter Sandman",
        "One",
        "Sober",
        "Alive",
        "Jeremy",
        "Zombie",
        "Basket Case",
    ],
    &[
        "Chop Suey!",
        "In The End",
        "Toxicity",
        "Seven Nation Army",
        "Boulevard of Broken Dreams",
        "Numb",
        "The Pretender",
        "Mr. Brightside",
        "Last Resort",
        "Diary of Jane",
    ],
];

const ARTISTS: [Pool; 5] = [
    &[
        "The Doors",
        "Jimi Hendrix",
        "The Beatles",
        "The Rolling Stones",
        "Jefferson Airplane",
        "Steppenwolf",
        "Cream",
        "The Who",
        "The Animals",
        "Creedence Clearwater Revival",
    ],
    &[
        "Led Zeppelin",
        "Black Sabbath",
        "Deep Purple",
        "Queen",
        "Pink Floyd",
        "AC/DC",
        "Aerosmith",
        "Lynyrd Skynyrd",
        "The Eagles",
        "Kiss",
    ],
    &[
        "Metallica",
        "Guns N' Roses",
        "Iron Maiden",
        "Judas Priest",
        "Motley Crue",
        "Van Halen",
        "Bon Jovi",
        "Def Leppard",
        "Megadeth",
        "Scorpions",
    ],
    &[
        "Nirvana",
        "Pearl Jam",
        "Soundgarden",
        "Alice In Chains",
        "Rage Against The Machine",
        "Tool",
        "Red Hot Chili Peppers",
        "Radiohead",
        "The Cranberries",
        "Green Day",
    ],
    &[
        "System Of A Down",
        "Linkin Park",
        "Disturbed",
        "The White Stripes",
        "Slipknot",
        "Evanescence",
        "Foo Fighters",
        "The Killers",
        "Papa Roach",
        "Breaking Benjamin",
    ],
];

const GUITARISTS: [Pool; 5] = [
    &[
        "Jimi Hendrix",
        "Keith Richards",
        "Eric Clapton",
        "Pete Townshend",
        "Jimmy Page",
        "Jeff Beck",
        "David Gilmour",
        "Jorma Kaukonen",
        "John Fogerty",
        "George Harrison",
    ],
    &[
        "Jimmy Page",
        "Tony Iommi",
        "Ritchie Blackmore",
        "Brian May",
        "David Gilmour",
        "Angus Young",
        "Joe Perry",
        "Allen Collins",
        "Don Felder",
        "Ace Frehley",
    ],
    &[
        "Kirk Hammett",
        "Slash",
        "Dave Murray",
        "K.K. Downing",
        "Mick Mars",
        "Eddie Van Halen",
        "Richie Sambora",
        "Phil Collen",
        "Marty Friedman",
        "Rudolf Schenker",
    ],
    &[
        "Kurt Cobain",
        "Mike McCready",
        "Kim Thayil",
        "Jerry Cantrell",
        "Tom Morello",
        "Adam Jones",
        "John Frusciante",
        "Jonny Greenwood",
        "Billie Joe Armstrong",
        "Noel Gallagher",
    ],
    &[
        "Daron Malakian",
        "Brad Delson",
        "Dan Donegan",
        "Jack White",
        "Jim Root",
        "Ben Moody",
        "Dave Grohl",
        "Matthew Bellamy",
        "Zacky Vengeance",
        "Mark Tremonti",
    ],
];

const TURKISH_ARTISTS: Pool = &[
    "Barış Manço",
    "Erkin Koray",
    "Cem Karaca",
    "Murat Ses",
    "Mor ve Ötesi",
    "Duman",
    "Pentagram/Mezarkabul",
    "Hayko Cepkin",
    "Kurban",
    "Şebnem Ferah",
];

const TURKISH_SONGS: Pool = &[
    "Dönence",
    "Yine Yalnızım",
    "Resimdeki Gözyaşları",
    "İşte Hendek İşte Deve",
    "Bir Derdim Var",
    "Senden Daha Güzel",
    "Lions In A Cage",
    "Bertaraf Et",
    "Yirmi",
    "Can Kırıkları",
];

/// Last-resort pool when everything else is exhausted
pub const DEFAULT_POOL: Pool = ARTISTS[2];

fn era_index(era: Era) -> usize {
    match era {
        Era::Sixties => 0,
        Era::Seventies => 1,
        Era::Eighties => 2,
        Era::Nineties => 3,
        Era::Noughties => 4,
    }
}

fn pools_for(kind: QuestionKind) -> &'static [Pool; 5] {
    match kind {
        QuestionKind::Song => &SONGS,
        QuestionKind::Artist => &ARTISTS,
        QuestionKind::Guitarist => &GUITARISTS,
    }
}

pub fn era_pool(kind: QuestionKind, era: Era) -> Pool {
    pools_for(kind)[era_index(era)]
}

/// Turkish pools exist for songs and artists only
pub fn turkish_pool(kind: QuestionKind) -> Option<Pool> {
    match kind {
        QuestionKind::Song => Some(TURKISH_SONGS),
        QuestionKind::Artist => Some(TURKISH_ARTISTS),
        QuestionKind::Guitarist => None,
    }
}

/// Every era of one kind, de-duplicated, in era order
pub fn all_eras(kind: QuestionKind) -> Vec<&'static str> {
    pools_for(kind)
        .iter()
        .flat_map(|pool| pool.iter().copied())
        .unique()
        .collect()
}

/// Pools to draw distractors from, in order: the era (or Turkish) pool, every era of
/// that kind, then the fixed default.
pub fn fallback_chain(kind: QuestionKind, genre_label: &str) -> Vec<Vec<&'static str>> {
    let primary = match GenreBucket::classify(genre_label) {
        GenreBucket::Turkish => turkish_pool(kind),
        GenreBucket::Generic => None,
    }
    .unwrap_or_else(|| era_pool(kind, Era::classify(genre_label)));

    vec![primary.to_vec(), all_eras(kind), DEFAULT_POOL.to_vec()]
}
