/// Crop categories the classifier has models for.
pub const CROP_TYPES: &[&str] = &[
    "general",
    "apple",
    "apricot",
    "avocado",
    "banana",
    "barley",
    "beans",
    "bell_pepper",
    "blackberry",
    "blueberry",
    "broccoli",
    "cabbage",
    "capsicum",
    "carrot",
    "cauliflower",
    "celery",
    "cherry",
    "chilli",
    "citrus",
    "coffee",
    "cucumber",
    "currant",
    "custard_apple",
    "eggplant",
    "elderberry",
    "fig",
    "grape",
    "grapefruit",
    "guava",
    "hazelnut",
    "hop",
    "kiwi",
    "kohlrabi",
    "lemon",
    "lettuce",
    "lime",
    "loquat",
    "mandarin",
    "mango",
    "melon",
    "mulberry",
    "nectarine",
    "oat",
    "okra",
    "olive",
    "onion",
    "orange",
    "papaya",
    "passion_fruit",
    "peach",
    "pear",
    "peas",
    "persimmon",
    "physalis",
    "pineapple",
    "plum",
    "pomegranate",
    "potato",
    "quince",
    "raspberry",
    "rice",
    "rye",
    "sorghum",
    "strawberry",
    "sugarcane",
    "sweet_potato",
    "tangerine",
    "tea",
    "tomato",
    "turnip",
    "walnut",
    "watermelon",
    "wheat",
    "zucchini",
];

pub fn is_supported_crop(category: &str) -> bool {
    CROP_TYPES.contains(&category)
}
