use crate::models::Exercise;

const fn exercise(
    title: &'static str,
    exercise_type: &'static str,
    body_part: &'static str,
    equipment: &'static str,
    level: &'static str,
    rating: f64,
    description: &'static str,
) -> Exercise {
    Exercise {
        title,
        exercise_type,
        body_part,
        equipment,
        level,
        rating,
        description,
    }
}

/// Built-in exercise catalog backing the recommender
pub static CATALOG: &[Exercise] = &[
    // Chest
    exercise("Push-ups", "Strength", "Chest", "Body Only", "Beginner", 8.5,
        "Classic chest exercise using body weight, keeping the core tight and elbows tucked"),
    exercise("Dumbbell Bench Press", "Strength", "Chest", "Dumbbell", "Beginner", 8.9,
        "Press dumbbells from the chest while lying on a flat bench"),
    exercise("Barbell Bench Press", "Powerlifting", "Chest", "Barbell", "Intermediate", 9.1,
        "Lower the barbell to mid chest and press it back to lockout"),
    exercise("Cable Crossover", "Strength", "Chest", "Cable", "Intermediate", 8.2,
        "Bring cable handles together in a wide hugging arc across the chest"),
    exercise("Clap Push-ups", "Plyometrics", "Chest", "Body Only", "Advanced", 7.8,
        "Explosive push-up with a hand clap at the top of the movement"),
    // Back
    exercise("Pull-ups", "Strength", "Lats", "Body Only", "Intermediate", 8.8,
        "Upper body pulling exercise hanging from a bar until the chin clears it"),
    exercise("Lat Pulldown", "Strength", "Lats", "Cable", "Beginner", 8.4,
        "Pull a cable bar down to the upper chest while seated"),
    exercise("Seated Cable Row", "Strength", "Middle Back", "Cable", "Beginner", 8.3,
        "Row a cable handle to the torso squeezing the shoulder blades together"),
    exercise("Bent Over Barbell Row", "Strength", "Middle Back", "Barbell", "Intermediate", 8.6,
        "Hinge at the hips and row a barbell to the lower ribs"),
    exercise("Deadlift", "Powerlifting", "Lower Back", "Barbell", "Intermediate", 9.4,
        "Lift a loaded barbell from the floor to hip height with a neutral spine"),
    exercise("Superman Hold", "Stretching", "Lower Back", "Body Only", "Beginner", 7.2,
        "Lie face down and lift arms and legs to strengthen the lower back"),
    // Shoulders and arms
    exercise("Dumbbell Shoulder Press", "Strength", "Shoulders", "Dumbbell", "Beginner", 8.6,
        "Press dumbbells overhead from shoulder height"),
    exercise("Lateral Raise", "Strength", "Shoulders", "Dumbbell", "Beginner", 8.0,
        "Raise dumbbells out to the sides to shoulder height"),
    exercise("Push Press", "Olympic Weightlifting", "Shoulders", "Barbell", "Advanced", 8.7,
        "Use a leg drive to press a barbell overhead explosively"),
    exercise("Dumbbell Bicep Curl", "Strength", "Biceps", "Dumbbell", "Beginner", 8.1,
        "Curl dumbbells toward the shoulders keeping elbows fixed"),
    exercise("Cable Hammer Curl", "Strength", "Biceps", "Cable", "Intermediate", 7.9,
        "Curl a rope attachment with a neutral grip"),
    exercise("Bench Dips", "Strength", "Triceps", "Body Only", "Beginner", 7.7,
        "Lower and raise the body using a bench behind you"),
    exercise("Cable Triceps Pushdown", "Strength", "Triceps", "Cable", "Beginner", 8.3,
        "Push a cable bar down until the arms are fully extended"),
    exercise("Farmer's Walk", "Strongman", "Forearms", "Dumbbell", "Intermediate", 8.5,
        "Walk a set distance while carrying heavy weights at your sides"),
    exercise("Barbell Shrug", "Strength", "Traps", "Barbell", "Beginner", 7.6,
        "Elevate the shoulders while holding a barbell at arm's length"),
    // Core
    exercise("Plank", "Strength", "Abdominals", "Body Only", "Beginner", 9.3,
        "Core stability exercise holding a straight line from head to heels"),
    exercise("Bicycle Crunch", "Strength", "Abdominals", "Body Only", "Beginner", 8.4,
        "Alternate elbow to opposite knee while pedalling the legs"),
    exercise("Hanging Leg Raise", "Strength", "Abdominals", "Body Only", "Advanced", 8.7,
        "Raise straight legs while hanging from a bar"),
    exercise("Cable Woodchopper", "Strength", "Abdominals", "Cable", "Intermediate", 7.9,
        "Rotate the torso pulling a cable diagonally across the body"),
    exercise("Kettlebell Russian Twist", "Strength", "Abdominals", "Kettlebells", "Intermediate", 7.8,
        "Rotate a kettlebell from side to side while seated with feet raised"),
    // Legs
    exercise("Squats", "Strength", "Quadriceps", "Body Only", "Beginner", 9.0,
        "Lower body strength exercise sitting back and down then standing up"),
    exercise("Barbell Back Squat", "Powerlifting", "Quadriceps", "Barbell", "Intermediate", 9.5,
        "Squat with a barbell across the upper back to below parallel"),
    exercise("Leg Press", "Strength", "Quadriceps", "Machine", "Beginner", 8.2,
        "Push a weighted sled away using the legs"),
    exercise("Box Jump", "Plyometrics", "Quadriceps", "Body Only", "Intermediate", 8.1,
        "Jump explosively onto a sturdy box and step back down"),
    exercise("Walking Lunges", "Strength", "Quadriceps", "Dumbbell", "Beginner", 8.5,
        "Step forward into alternating lunges while holding dumbbells"),
    exercise("Romanian Deadlift", "Strength", "Hamstrings", "Barbell", "Intermediate", 8.8,
        "Hinge at the hips lowering a barbell along the legs"),
    exercise("Lying Leg Curl", "Strength", "Hamstrings", "Machine", "Beginner", 7.9,
        "Curl the heels toward the glutes on a leg curl machine"),
    exercise("Standing Hamstring Stretch", "Stretching", "Hamstrings", "Body Only", "Beginner", 7.5,
        "Reach toward the toes with straight legs to lengthen the hamstrings"),
    exercise("Glute Bridge", "Strength", "Glutes", "Body Only", "Beginner", 8.6,
        "Drive the hips up from the floor squeezing the glutes"),
    exercise("Kettlebell Swing", "Strength", "Glutes", "Kettlebells", "Intermediate", 8.9,
        "Swing a kettlebell to chest height driven by a powerful hip hinge"),
    exercise("Cable Kickback", "Strength", "Glutes", "Cable", "Beginner", 7.8,
        "Kick one leg back against cable resistance"),
    exercise("Standing Calf Raise", "Strength", "Calves", "Body Only", "Beginner", 7.4,
        "Rise onto the toes and lower slowly"),
    exercise("Adductor Side Lunge", "Stretching", "Adductors", "Body Only", "Beginner", 7.3,
        "Shift side to side in a wide stance to open the inner thighs"),
    // Full body and conditioning
    exercise("Running", "Cardio", "Quadriceps", "Body Only", "Beginner", 9.2,
        "Aerobic cardiovascular exercise at a steady conversational pace"),
    exercise("Jumping Jacks", "Cardio", "Calves", "Body Only", "Beginner", 8.0,
        "Jump while spreading the legs and raising the arms overhead"),
    exercise("Rowing Machine", "Cardio", "Middle Back", "Machine", "Beginner", 8.7,
        "Row at a steady stroke rate driving with the legs first"),
    exercise("Burpees", "Plyometrics", "Quadriceps", "Body Only", "Intermediate", 8.3,
        "Drop to a push-up then jump up explosively with arms overhead"),
    exercise("Mountain Climbers", "Cardio", "Abdominals", "Body Only", "Beginner", 8.2,
        "Drive the knees toward the chest alternately from a plank position"),
    exercise("Power Clean", "Olympic Weightlifting", "Hamstrings", "Barbell", "Advanced", 9.0,
        "Pull a barbell from the floor and catch it on the front of the shoulders"),
    exercise("Tire Flip", "Strongman", "Quadriceps", "Other", "Advanced", 8.4,
        "Flip a heavy tire end over end using the legs and hips"),
    exercise("Child's Pose", "Stretching", "Lower Back", "Body Only", "Beginner", 7.6,
        "Sit back on the heels with arms extended to relax the back"),
    exercise("Chest Doorway Stretch", "Stretching", "Chest", "Body Only", "Beginner", 7.1,
        "Lean through a doorway with arms on the frame to open the chest"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_titles_are_unique() {
        let titles: HashSet<&str> = CATALOG.iter().map(|e| e.title).collect();
        assert_eq!(titles.len(), CATALOG.len());
    }

    #[test]
    fn test_ratings_in_range() {
        assert!(CATALOG.iter().all(|e| (0.0..=10.0).contains(&e.rating)));
    }

    #[test]
    fn test_every_level_present() {
        for level in ["Beginner", "Intermediate", "Advanced"] {
            assert!(CATALOG.iter().any(|e| e.level == level), "missing {}", level);
        }
    }
}
