use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::models::{
    Exercise, ExerciseCategories, ExerciseFilter, ExerciseSummary, ExperienceLevel, Gender,
    Recommendation, ResolvedProfile, SimilarExercise, UserProfile,
};
use crate::services::exercise_catalog::CATALOG;

pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// Preferred pools need at least this many matches to replace the wider pool
const GENDER_PREFERENCE_MIN: usize = 10;

const FEMALE_BODY_PARTS: &[&str] = &["Abdominals", "Glutes", "Quadriceps", "Calves", "Hamstrings"];
const FEMALE_TYPES: &[&str] = &["Cardio", "Strength", "Stretching"];
const MALE_BODY_PARTS: &[&str] = &["Chest", "Biceps", "Triceps", "Shoulders", "Lats"];
const MALE_TYPES: &[&str] = &["Strength", "Powerlifting", "Olympic Weightlifting"];

const STOP_WORDS: &[&str] = &[
    "a", "about", "across", "along", "an", "and", "are", "as", "at", "back", "be", "below", "by",
    "down", "each", "first", "for", "from", "front", "in", "into", "is", "it", "its", "keeping",
    "of", "off", "on", "one", "or", "out", "over", "side", "the", "then", "to", "together",
    "top", "toward", "until", "up", "using", "while", "with", "you", "your",
];

/// Content-based exercise recommender over the built-in catalog.
///
/// TF-IDF vectors (unigrams and bigrams of each exercise's text) are built once
/// at construction and shared read-only between requests.
pub struct ExerciseRecommender {
    catalog: Vec<Exercise>,
    vectors: Vec<HashMap<String, f64>>,
}

impl Default for ExerciseRecommender {
    fn default() -> Self {
        Self::new(CATALOG.to_vec())
    }
}

impl ExerciseRecommender {
    pub fn new(catalog: Vec<Exercise>) -> Self {
        let vectors = tfidf_vectors(&catalog);
        debug!(exercises = catalog.len(), "exercise recommender ready");
        Self { catalog, vectors }
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Personalised recommendations for a profile
    pub fn recommend(&self, profile: &UserProfile, count: usize) -> Vec<Recommendation> {
        let profile = profile.resolve();
        let all: Vec<&Exercise> = self.catalog.iter().collect();

        let mut pool = personalized_pool(&all, &profile);
        if pool.is_empty() {
            pool = all.clone();
        }

        let mut filtered = filter_by_level(pool, profile.experience_level);
        filtered = filter_by_age(filtered, profile.age);
        filtered = apply_gender_preference(filtered, profile.gender);
        if filtered.is_empty() {
            filtered = all;
        }

        sort_by_rating(&mut filtered);

        diversify(filtered, count)
            .into_iter()
            .map(|exercise| build_recommendation(exercise, &profile))
            .collect()
    }

    pub fn categories(&self) -> ExerciseCategories {
        fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
            values
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(String::from)
                .collect()
        }

        ExerciseCategories {
            types: distinct(self.catalog.iter().map(|e| e.exercise_type)),
            body_parts: distinct(self.catalog.iter().map(|e| e.body_part)),
            equipment: distinct(self.catalog.iter().map(|e| e.equipment)),
            levels: distinct(self.catalog.iter().map(|e| e.level)),
        }
    }

    /// Exact-match filtering, best rated first. Estimates use the default profile.
    pub fn filter(&self, filter: &ExerciseFilter) -> Vec<ExerciseSummary> {
        fn accepts(wanted: &Option<String>, actual: &str) -> bool {
            match wanted.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => value == actual,
                _ => true,
            }
        }

        let profile = UserProfile::default().resolve();
        let mut matches: Vec<&Exercise> = self
            .catalog
            .iter()
            .filter(|e| accepts(&filter.exercise_type, e.exercise_type))
            .filter(|e| accepts(&filter.body_part, e.body_part))
            .filter(|e| accepts(&filter.equipment, e.equipment))
            .filter(|e| accepts(&filter.level, e.level))
            .filter(|e| filter.min_rating.map_or(true, |min| e.rating >= min))
            .collect();
        sort_by_rating(&mut matches);

        matches
            .into_iter()
            .map(|exercise| ExerciseSummary {
                name: exercise.title.to_string(),
                exercise_type: exercise.exercise_type.to_string(),
                equipment: exercise.equipment.to_string(),
                level: exercise.level.to_string(),
                body_part: exercise.body_part.to_string(),
                calories_burned: estimate_calories(exercise, &profile),
                duration: estimate_duration(exercise, &profile),
                description: exercise.description.to_string(),
                rating: exercise.rating,
            })
            .collect()
    }

    /// Most similar catalog entries by text, excluding the exercise itself
    pub fn similar(&self, exercise_name: &str, count: usize) -> Vec<SimilarExercise> {
        let Some(base) = self.catalog.iter().position(|e| e.title == exercise_name) else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != base)
            .map(|(index, vector)| (index, cosine(&self.vectors[base], vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(count);

        scored
            .into_iter()
            .map(|(index, score)| {
                let exercise = &self.catalog[index];
                SimilarExercise {
                    name: exercise.title.to_string(),
                    exercise_type: exercise.exercise_type.to_string(),
                    equipment: exercise.equipment.to_string(),
                    level: exercise.level.to_string(),
                    body_part: exercise.body_part.to_string(),
                    description: exercise.description.to_string(),
                    rating: exercise.rating,
                    similarity_score: round_to(score, 4),
                }
            })
            .collect()
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn sort_by_rating(exercises: &mut [&Exercise]) {
    exercises.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

/// Starting pool by age band
fn personalized_pool<'a>(exercises: &[&'a Exercise], profile: &ResolvedProfile) -> Vec<&'a Exercise> {
    let keep = |e: &Exercise| -> bool {
        match profile.age {
            age if age < 18 => {
                ["Cardio", "Strength", "Plyometrics"].contains(&e.exercise_type)
                    || ["Body Only", "Dumbbell"].contains(&e.equipment)
            }
            age if age < 25 => true,
            age if age < 40 => ["Strength", "Cardio", "Stretching"].contains(&e.exercise_type),
            age if age < 60 => {
                ["Body Only", "Cable", "Dumbbell"].contains(&e.equipment)
                    && ["Strength", "Cardio", "Stretching"].contains(&e.exercise_type)
            }
            _ => {
                ["Body Only", "Cable"].contains(&e.equipment)
                    && ["Strength", "Stretching", "Cardio"].contains(&e.exercise_type)
            }
        }
    };

    exercises.iter().copied().filter(|e| keep(*e)).collect()
}

fn filter_by_level(exercises: Vec<&Exercise>, level: ExperienceLevel) -> Vec<&Exercise> {
    match level {
        ExperienceLevel::Beginner => exercises
            .into_iter()
            .filter(|e| ExperienceLevel::Beginner.matches(e.level))
            .collect(),
        ExperienceLevel::Intermediate => exercises
            .into_iter()
            .filter(|e| {
                ExperienceLevel::Beginner.matches(e.level)
                    || ExperienceLevel::Intermediate.matches(e.level)
            })
            .collect(),
        ExperienceLevel::Advanced => exercises,
    }
}

fn filter_by_age(exercises: Vec<&Exercise>, age: i32) -> Vec<&Exercise> {
    if age < 18 {
        exercises.into_iter().filter(|e| e.equipment != "Barbell").collect()
    } else if age > 50 {
        exercises
            .into_iter()
            .filter(|e| e.exercise_type != "Plyometrics")
            .collect()
    } else {
        exercises
    }
}

fn apply_gender_preference(exercises: Vec<&Exercise>, gender: Gender) -> Vec<&Exercise> {
    let (body_parts, types) = match gender {
        Gender::Female => (FEMALE_BODY_PARTS, FEMALE_TYPES),
        Gender::Male => (MALE_BODY_PARTS, MALE_TYPES),
    };

    let preferred: Vec<&Exercise> = exercises
        .iter()
        .copied()
        .filter(|e| body_parts.contains(&e.body_part) || types.contains(&e.exercise_type))
        .collect();

    if preferred.len() >= GENDER_PREFERENCE_MIN {
        preferred
    } else {
        exercises
    }
}

/// Top two per body part and per type, deduplicated, best rated first.
/// Input must already be sorted by rating.
fn diversify(exercises: Vec<&Exercise>, count: usize) -> Vec<&Exercise> {
    if exercises.len() <= count {
        return exercises;
    }

    fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        let mut order = Vec::new();
        for value in values {
            if !order.contains(&value) {
                order.push(value);
            }
        }
        order
    }

    let mut picked: Vec<&Exercise> = Vec::new();
    for body_part in first_seen(exercises.iter().map(|e| e.body_part)) {
        picked.extend(exercises.iter().filter(|e| e.body_part == body_part).take(2));
    }
    for exercise_type in first_seen(exercises.iter().map(|e| e.exercise_type)) {
        picked.extend(exercises.iter().filter(|e| e.exercise_type == exercise_type).take(2));
    }

    let mut seen = HashSet::new();
    picked.retain(|e| seen.insert(e.title));
    sort_by_rating(&mut picked);
    picked.truncate(count);
    picked
}

fn build_recommendation(exercise: &Exercise, profile: &ResolvedProfile) -> Recommendation {
    Recommendation {
        name: exercise.title.to_string(),
        exercise_type: exercise.exercise_type.to_string(),
        equipment: exercise.equipment.to_string(),
        level: exercise.level.to_string(),
        body_part: exercise.body_part.to_string(),
        calories_burned: estimate_calories(exercise, profile),
        duration: estimate_duration(exercise, profile),
        description: exercise.description.to_string(),
        instructions: instructions(exercise),
        similarity_score: personalized_score(exercise, profile),
        rating: exercise.rating,
        recommended_for: recommendation_reason(exercise, profile),
        difficulty: difficulty(exercise, profile.experience_level).to_string(),
        target_muscles: target_muscles(exercise.body_part).to_string(),
        benefits: benefits(exercise, profile),
    }
}

pub fn personalized_score(exercise: &Exercise, profile: &ResolvedProfile) -> f64 {
    let mut score = 0.5;

    let level = profile.experience_level;
    if level.matches(exercise.level) {
        score += 0.3;
    } else if level == ExperienceLevel::Intermediate && ExperienceLevel::Beginner.matches(exercise.level) {
        score += 0.2;
    } else if level == ExperienceLevel::Advanced {
        score += 0.2;
    }

    if profile.age < 18 && exercise.equipment == "Body Only" {
        score += 0.1;
    } else if profile.age > 50 && ["Body Only", "Cable"].contains(&exercise.equipment) {
        score += 0.1;
    }

    let favoured: &[&str] = match profile.gender {
        Gender::Female => &["Abdominals", "Glutes", "Quadriceps"],
        Gender::Male => &["Chest", "Biceps", "Triceps"],
    };
    if favoured.contains(&exercise.body_part) {
        score += 0.1;
    }

    if exercise.rating > 8.0 {
        score += 0.1;
    }

    round_to(f64::min(score, 1.0), 2)
}

fn recommendation_reason(exercise: &Exercise, profile: &ResolvedProfile) -> String {
    let mut reasons = vec![match profile.age {
        age if age < 18 => "Great for developing fitness foundation",
        age if age < 25 => "Perfect for building strength and endurance",
        age if age < 40 => "Excellent for maintaining fitness and health",
        age if age < 60 => "Joint-friendly and effective for your age group",
        _ => "Safe and effective for senior fitness",
    }];

    match profile.gender {
        Gender::Female if ["Abdominals", "Glutes"].contains(&exercise.body_part) => {
            reasons.push("Targets areas commonly focused on by women")
        }
        Gender::Male if ["Chest", "Biceps"].contains(&exercise.body_part) => {
            reasons.push("Builds upper body strength")
        }
        _ => {}
    }

    reasons.push(match profile.experience_level {
        ExperienceLevel::Beginner => "Perfect for beginners",
        ExperienceLevel::Intermediate => "Challenging but achievable",
        ExperienceLevel::Advanced => "Advanced exercise for experienced users",
    });

    reasons.join(" • ")
}

/// Difficulty of an exercise relative to the user's level
pub fn difficulty(exercise: &Exercise, level: ExperienceLevel) -> &'static str {
    match (level, exercise.level) {
        (ExperienceLevel::Advanced, _) => "Challenging",
        (ExperienceLevel::Beginner | ExperienceLevel::Intermediate, "Beginner") => "Easy",
        _ => "Moderate",
    }
}

pub fn target_muscles(body_part: &str) -> &str {
    match body_part {
        "Chest" => "Pectoralis Major, Anterior Deltoids",
        "Biceps" => "Biceps Brachii, Brachialis",
        "Triceps" => "Triceps Brachii",
        "Shoulders" => "Deltoids (Anterior, Lateral, Posterior)",
        "Lats" => "Latissimus Dorsi",
        "Abdominals" => "Rectus Abdominis, Obliques, Transverse Abdominis",
        "Quadriceps" => "Rectus Femoris, Vastus Lateralis, Vastus Medialis, Vastus Intermedius",
        "Hamstrings" => "Biceps Femoris, Semitendinosus, Semimembranosus",
        "Glutes" => "Gluteus Maximus, Gluteus Medius, Gluteus Minimus",
        "Calves" => "Gastrocnemius, Soleus",
        "Lower Back" => "Erector Spinae",
        "Middle Back" => "Rhomboids, Trapezius",
        "Traps" => "Trapezius",
        "Forearms" => "Flexors, Extensors",
        "Adductors" => "Adductor Magnus, Adductor Longus, Adductor Brevis",
        "Abductors" => "Gluteus Medius, Tensor Fasciae Latae",
        other => other,
    }
}

fn benefits(exercise: &Exercise, profile: &ResolvedProfile) -> String {
    let mut benefits: Vec<&str> = match exercise.exercise_type {
        "Strength" => vec!["Builds muscle strength", "Improves bone density"],
        "Cardio" => vec!["Improves cardiovascular health", "Burns calories"],
        "Stretching" => vec!["Improves flexibility", "Reduces muscle tension"],
        _ => Vec::new(),
    };

    benefits.push(match profile.age {
        age if age < 25 => "Builds foundation for lifelong fitness",
        age if age < 40 => "Maintains muscle mass and metabolism",
        age if age < 60 => "Supports healthy aging",
        _ => "Maintains independence and mobility",
    });

    benefits.join(", ")
}

/// Calories per session, adjusted for body weight and age
pub fn estimate_calories(exercise: &Exercise, profile: &ResolvedProfile) -> i32 {
    let mut calories = match exercise.exercise_type {
        "Strength" => 8,
        "Cardio" => 15,
        "Plyometrics" => 12,
        "Stretching" => 3,
        "Powerlifting" => 10,
        "Olympic Weightlifting" => 12,
        "Strongman" => 14,
        _ => 10,
    };

    if profile.weight > 80.0 {
        calories += 3;
    } else if profile.weight < 60.0 {
        calories -= 2;
    }

    if profile.age > 50 {
        calories = (calories as f64 * 0.8) as i32;
    }

    calories.max(3)
}

/// Minutes per session, adjusted for experience and age
pub fn estimate_duration(exercise: &Exercise, profile: &ResolvedProfile) -> i32 {
    let mut duration = match exercise.exercise_type {
        "Strength" => 12,
        "Cardio" => 25,
        "Plyometrics" => 15,
        "Stretching" => 8,
        "Powerlifting" => 15,
        "Olympic Weightlifting" => 18,
        "Strongman" => 20,
        _ => 15,
    };

    match profile.experience_level {
        ExperienceLevel::Beginner => duration += 5,
        ExperienceLevel::Advanced => duration -= 3,
        ExperienceLevel::Intermediate => {}
    }

    if profile.age > 50 {
        duration += 3;
    }

    duration.max(5)
}

fn instructions(exercise: &Exercise) -> String {
    match exercise.exercise_type {
        "Strength" => format!(
            "Perform 3 sets of 8-12 reps for {} strength. Focus on proper form and controlled movement.",
            exercise.body_part
        ),
        "Cardio" => "Perform for 20-30 minutes at moderate intensity. Maintain steady pace throughout."
            .to_string(),
        "Plyometrics" => {
            "Perform 3 sets of 10-15 reps with explosive movement. Rest 60-90 seconds between sets."
                .to_string()
        }
        "Stretching" => "Hold each stretch for 20-30 seconds. Breathe deeply and don't bounce.".to_string(),
        _ => "Follow the exercise description and maintain proper form throughout the movement."
            .to_string(),
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() >= 2 && !STOP_WORDS.contains(&token.as_str()))
        .collect()
}

/// Unigram and bigram counts of one document
fn term_counts(text: &str) -> HashMap<String, f64> {
    let tokens = tokenize(text);
    let mut counts = HashMap::new();
    for token in &tokens {
        *counts.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    for pair in tokens.windows(2) {
        *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0.0) += 1.0;
    }
    counts
}

/// L2-normalised TF-IDF vectors with smoothed idf: ln((1 + n) / (1 + df)) + 1
fn tfidf_vectors(catalog: &[Exercise]) -> Vec<HashMap<String, f64>> {
    let documents: Vec<HashMap<String, f64>> = catalog
        .iter()
        .map(|e| {
            term_counts(&format!(
                "{} {} {} {} {} {}",
                e.title, e.description, e.exercise_type, e.body_part, e.equipment, e.level
            ))
        })
        .collect();

    let mut document_frequency: HashMap<&str, f64> = HashMap::new();
    for document in &documents {
        for term in document.keys() {
            *document_frequency.entry(term.as_str()).or_insert(0.0) += 1.0;
        }
    }

    let n = documents.len() as f64;
    documents
        .iter()
        .map(|document| {
            let mut vector: HashMap<String, f64> = document
                .iter()
                .map(|(term, count)| {
                    let df = document_frequency.get(term.as_str()).copied().unwrap_or(0.0);
                    let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                    (term.clone(), count * idf)
                })
                .collect();

            let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                vector.values_mut().for_each(|w| *w /= norm);
            }
            vector
        })
        .collect()
}

/// Dot product of two normalised sparse vectors
fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum()
}
